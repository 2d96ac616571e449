//! Species records.

/// Name of the solvent; it is always basis species 0.
pub const WATER: &str = "H2O";

/// Phase of a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpeciesKind {
    /// Dissolved species (including water and surface complexes)
    Aqueous,
    /// Solid phase; activity is 1
    Mineral,
    /// Gas phase; activity is the fugacity
    Gas,
}

/// A basis or equilibrium species.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Species {
    pub name: String,
    pub kind: SpeciesKind,
    /// Charge in units of the elementary charge
    pub charge: f64,
    /// Molecular weight [g/mol]
    pub molecular_weight: f64,
    /// Ion-size parameter [Å] used by Debye-Hückel models
    pub radius: f64,
    /// Index of the sorbing surface this species is a complex of, if any
    pub surface: Option<usize>,
}

impl Species {
    fn with_kind(name: impl Into<String>, kind: SpeciesKind, charge: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            charge,
            molecular_weight: 0.0,
            radius: 0.0,
            surface: None,
        }
    }

    pub fn aqueous(name: impl Into<String>, charge: f64) -> Self {
        Self::with_kind(name, SpeciesKind::Aqueous, charge)
    }

    pub fn mineral(name: impl Into<String>) -> Self {
        Self::with_kind(name, SpeciesKind::Mineral, 0.0)
    }

    pub fn gas(name: impl Into<String>) -> Self {
        Self::with_kind(name, SpeciesKind::Gas, 0.0)
    }

    /// A surface complex on sorbing surface `surface`.
    pub fn sorbed(name: impl Into<String>, charge: f64, surface: usize) -> Self {
        let mut species = Self::with_kind(name, SpeciesKind::Aqueous, charge);
        species.surface = Some(surface);
        species
    }

    pub fn with_molecular_weight(mut self, molecular_weight: f64) -> Self {
        self.molecular_weight = molecular_weight;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn is_water(&self) -> bool {
        self.name == WATER
    }

    pub fn is_mineral(&self) -> bool {
        self.kind == SpeciesKind::Mineral
    }

    pub fn is_gas(&self) -> bool {
        self.kind == SpeciesKind::Gas
    }

    pub fn is_surface_related(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_charged(&self) -> bool {
        self.charge != 0.0
    }
}

/// A mineral surface on which sorption complexes form.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SorbingSurface {
    /// Name of the mineral providing the surface
    pub mineral: String,
    /// Specific area [m²/g] when the mineral is a basis species, else total area [m²]
    pub area: f64,
}
