mod exam_vm;
mod text_vm;
mod time_fmt;

pub use exam_vm::{ExamIntent, ExamVm, OptionState, start_exam};
pub use text_vm::{markdown_to_html, sanitize_html};
pub use time_fmt::format_elapsed;
