pub mod mmap;

pub use mmap::MmapFile;
