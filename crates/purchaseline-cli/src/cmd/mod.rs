pub mod init;
pub mod load;
