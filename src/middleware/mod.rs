pub mod gate;
pub mod paging;
