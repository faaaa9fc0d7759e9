pub mod model;

pub use model::{NoteBook, NoteRef, Share, UserRef};
