//! In-memory data transformations.
//!
//! The processing layer operates on [`crate::types::DataSet`] values produced by ingestion
//! and by the pipeline stages.
//!
//! - [`filter()`]: row filtering by predicate
//! - [`map()`]: row mapping by user function
//! - [`reduce()`]: column reductions (count/min/max/median)
//!
//! ```rust
//! use nhanes_etl::processing::{filter, reduce, ReduceOp};
//! use nhanes_etl::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("id", DataType::Utf8),
//!     Field::new("acr", DataType::Float64),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::Utf8("1".into()), Value::Float64(10.0)],
//!         vec![Value::Utf8("I-2".into()), Value::Float64(500.0)],
//!         vec![Value::Utf8("3".into()), Value::Float64(20.0)],
//!         vec![Value::Utf8("4".into()), Value::Null],
//!     ],
//! );
//!
//! let kept = filter(&ds, |row| !matches!(&row[0], Value::Utf8(s) if s.starts_with("I-")));
//! let median = reduce(&kept, "acr", ReduceOp::Median).unwrap();
//! assert_eq!(median, Value::Float64(15.0));
//! ```

pub mod filter;
pub mod map;
pub mod reduce;

pub use filter::filter;
pub use map::map;
pub use reduce::{median, reduce, ReduceOp};
