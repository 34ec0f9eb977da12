pub mod logging;
pub mod media;
pub mod notify;
pub mod scroll;
pub mod shell;
pub mod suspend;
#[cfg(test)]
pub mod test_utils;
