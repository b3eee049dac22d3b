pub mod objects;
pub mod writer;
pub mod fonts;
pub mod textflow;
pub mod images;
pub mod doc;

pub use doc::{Color, DocBuilder};
pub use fonts::{Font, Metrics};
pub use images::Logo;
pub use textflow::{normalize, wrap};
