// Pure arena rules, free of I/O and channels.

pub mod combat;
pub mod spawn;
