pub mod errors;
pub mod io;
pub mod logging;

pub use errors::NotifyError;
pub use io::Console;
pub use logging::{initialize_logging, log_session_event};
