//! ge-database: the chemical model a speciation solve runs against.
//!
//! Provides:
//! - Species records (aqueous, mineral, gas, surface-sorbed)
//! - `ModelDatabase`: basis and equilibrium species, the stoichiometric matrix
//!   and the log10 equilibrium-constant table
//! - `DatabaseBuilder` for incremental construction with validation
//! - `BasisSwapper` trait and the `SpeciesSwapper` stoichiometric pivot
//!
//! # Example
//!
//! ```
//! use ge_database::{DatabaseBuilder, Species};
//!
//! let mut builder = DatabaseBuilder::new(vec![25.0]);
//! builder.add_basis(Species::aqueous("H2O", 0.0).with_molecular_weight(18.0152));
//! builder.add_basis(Species::aqueous("H+", 1.0).with_radius(9.0));
//! builder.add_equilibrium(
//!     Species::aqueous("OH-", -1.0).with_radius(3.5),
//!     &[("H2O", 1.0), ("H+", -1.0)],
//!     &[13.9951],
//! );
//! let db = builder.build().unwrap();
//! assert_eq!(db.num_basis(), 2);
//! assert_eq!(db.stoichiometry()[(0, 1)], -1.0);
//! ```

pub mod builder;
pub mod database;
pub mod error;
pub mod species;
pub mod swapper;
pub mod validate;

pub use builder::DatabaseBuilder;
pub use database::ModelDatabase;
pub use error::{DatabaseError, DatabaseResult, SwapError, SwapResult};
pub use species::{SorbingSurface, Species, SpeciesKind, WATER};
pub use swapper::{BasisSwapper, SpeciesSwapper};
