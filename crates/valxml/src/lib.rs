//! Schema-less conversion of value trees into XML.
//!
//! This crate turns an in-memory [`Value`] tree into an XML document without
//! a schema. Values are built directly, through [`ToValue`], or from any
//! `serde::Serialize` type via [`to_value`].
//!
//! # Key components
//!
//! - [`Value`], [`Record`] and [`Mapping`] model the shapes a value can take
//! - [`XmlSerializer`] and the [`convert`] family produce documents
//! - [`decapitalize`] and [`canonical_number`] are the name and number rules
//! - [`check_well_formed`] verifies a document parses with a standard reader
//!
//! # Example
//!
//! ```
//! use valxml::{Mapping, convert};
//!
//! let data = Mapping::new().with("id", 7).with("name", "A&B");
//! let xml = convert("xmlData", &data.into(), true).unwrap();
//! assert_eq!(
//!     xml,
//!     "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<xmlData><id>7</id>\n<name>A&amp;B</name>\n</xmlData>"
//! );
//! ```

pub mod check;
pub mod config;
pub mod error;
pub mod naming;
pub mod ser;
pub mod serialize;
pub mod text;
pub mod value;

pub use check::check_well_formed;
pub use config::{DEFAULT_DATETIME_FORMAT, DEFAULT_MAX_DEPTH, DEFAULT_ROOT_NAME, XmlConfig};
pub use error::{PropertyError, XmlError, XmlResult};
pub use naming::{TagNaming, decapitalize, is_xml_name, property_name};
pub use ser::{ValueSerializer, to_value};
pub use serialize::{
    XmlSerializer, convert, convert_default, convert_named, emit, to_xml,
};
pub use text::{canonical_number, escape_text, strip_invalid_chars};
pub use value::{Mapping, Number, Property, Record, ToValue, Value};
