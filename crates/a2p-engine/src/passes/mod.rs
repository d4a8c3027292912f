//! Batch entry points
//!
//! Each pass is a [`RowPass`](crate::runner::RowPass) run over a whole
//! checkpoint by the [`BatchRunner`](crate::runner::BatchRunner). Admission is
//! decided from the fields a row already carries, so rerunning a pass only
//! touches rows that still have work left.

mod attach;
mod refresh;
mod register;
mod resume;
mod update;

pub use attach::PhoneAttachPass;
pub use refresh::StatusRefreshPass;
pub use register::RegisterPass;
pub use resume::ResumePass;
pub use update::ProfileUpdatePass;

pub const BLANK_ROW: &str = "no business name";
