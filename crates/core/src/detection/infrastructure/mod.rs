pub mod cascade_face_source;
pub mod cascade_resource;
pub mod replay_signal_source;
