mod remote;

pub use remote::{RemoteBank, RemoteQuestionRow};
