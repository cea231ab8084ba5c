//! Command dispatch, one module per subcommand group, mirroring the
//! teacher's `handle_X_command` layout.

pub mod eval;
pub mod memory;
pub mod schedule;
pub mod serve;
pub mod workflow;
