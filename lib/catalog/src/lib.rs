//! # trimsight Catalog
//!
//! Reads the processed vehicle trim catalog and renders each row into the
//! descriptive text that gets embedded.
//!
//! ```rust
//! use trimsight_catalog::{read_catalog, render_corpus};
//!
//! let csv = "hack-id,year,make,model,trim,msrp,seats,type,engine_type,cylinders,horsepower_hp,combined_mpg,estimated_current_cost,expected_value_2027\n\
//!            2025-camry-le,2025,Toyota,Camry,LE,28400,5,sedan,gas,4,203,32,28400,20448";
//! let records = read_catalog(csv.as_bytes()).unwrap();
//! let corpus = render_corpus(&records);
//! assert!(corpus[0].text.contains("This is a Toyota Camry LE."));
//! ```

pub mod loader;
pub mod record;
pub mod render;

pub use loader::{load_catalog, load_corpus, read_catalog, render_corpus};
pub use record::{CarRecord, CatalogEntry, REQUIRED_COLUMNS};
pub use render::render_text;
