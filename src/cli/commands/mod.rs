mod init;
mod users;

pub use init::cmd_init;
pub use users::{cmd_users_add, cmd_users_block, cmd_users_list, cmd_users_remove};
