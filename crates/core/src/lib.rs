pub mod shared {
    pub mod constants;
    pub mod engine_error;
    pub mod frame;
    pub mod geometry;
    pub mod image_ops;
    pub mod resource_resolver;
    pub mod session_config;
}

pub mod detection {
    pub mod domain {
        pub mod cascade_classifier;
        pub mod eye_region;
        pub mod face;
        pub mod face_landmarks;
        pub mod face_signal_source;
    }
    pub mod infrastructure;
}

pub mod blink {
    pub mod domain {
        pub mod blink_state_machine;
        pub mod eye_closure_classifier;
    }
    pub mod infrastructure;
}

pub mod gaze {
    pub mod domain {
        pub mod gaze_mapper;
    }
}

pub mod bubbles {
    pub mod domain {
        pub mod bubble;
        pub mod bubble_detector;
        pub mod bubble_field;
        pub mod render_sink;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod analysis_logger;
    pub mod frame_analyzer;
    pub mod gaze_session;
    pub mod infrastructure;
}
