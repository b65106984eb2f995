pub mod threaded_frame_worker;
