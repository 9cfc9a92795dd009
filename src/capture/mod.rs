pub mod recorder;

pub use recorder::ResponseRecorder;
