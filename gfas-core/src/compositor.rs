//! Compositing of emission-factor tables with land cover and dry matter fields
//!
//! Each grid cell belongs to at most one land cover class, identified by matching the
//! land cover value against the class code (see [`LandCoverClass::matches`]). The
//! compositor builds two kinds of output fields from this classification:
//!
//! - **Emission fluxes**: for a factor set and species,
//!   $E(i) = \sum_c DM(i) \cdot EF_c \cdot [\text{cell } i \in c]$
//! - **Factor ratios**: for a land cover class and species, the revised over the reference
//!   factor inside the class and 1 elsewhere, so that the field can be applied as a
//!   multiplicative adjustment.
//!
//! Input fields are only borrowed; every output is a fresh field derived from the
//! metadata of an input.

use crate::emission_factors::{EmissionFactorTable, FactorSet};
use crate::errors::{GfasError, GfasResult};
use crate::grid::GridField;
use crate::land_cover::LandCoverClass;
use crate::parameters::EmissionParameters;
use crate::species::Species;
use crate::FloatValue;
use log::{debug, warn};
use ndarray::{Array2, Zip};

/// Ratio fields for one land cover class, one per requested species
#[derive(Debug, Clone, PartialEq)]
pub struct RatioFields {
    pub class: LandCoverClass,
    pub fields: Vec<GridField>,
}

/// Emission flux fields for one factor set, one per requested species
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionFields {
    pub factor_set: FactorSet,
    pub fields: Vec<GridField>,
}

/// Combines an emission-factor table with land cover and dry matter fields
#[derive(Debug, Clone, Copy)]
pub struct FieldCompositor<'a> {
    table: &'a EmissionFactorTable,
    params: &'a EmissionParameters,
}

impl<'a> FieldCompositor<'a> {
    pub fn new(table: &'a EmissionFactorTable, params: &'a EmissionParameters) -> Self {
        Self { table, params }
    }

    /// Check that `field` is the dry matter burnt (combustion rate) field
    pub fn validate_dry_matter(&self, field: &GridField) -> GfasResult<()> {
        if field.short_name() != self.params.dry_matter_short_name {
            return Err(GfasError::InputValidation(format!(
                "dry matter field has short name {:?}, expected {:?}",
                field.short_name(),
                self.params.dry_matter_short_name
            )));
        }
        Ok(())
    }

    /// Check that `field` is the dominant land cover field
    pub fn validate_land_cover(&self, field: &GridField) -> GfasResult<()> {
        if field.param_id() != Some(self.params.land_cover_param_id) {
            return Err(GfasError::InputValidation(format!(
                "land cover field {:?} has parameter id {:?}, expected {}",
                field.short_name(),
                field.param_id(),
                self.params.land_cover_param_id
            )));
        }
        Ok(())
    }

    /// Check both input fields and that they share a grid
    pub fn validate_inputs(&self, dry_matter: &GridField, land_cover: &GridField) -> GfasResult<()> {
        self.validate_dry_matter(dry_matter)?;
        self.validate_land_cover(land_cover)?;
        if dry_matter.shape() != land_cover.shape() {
            return Err(GfasError::InputValidation(format!(
                "dry matter grid has shape {:?} but land cover grid has shape {:?}",
                dry_matter.shape(),
                land_cover.shape()
            )));
        }
        Ok(())
    }

    /// Cells of `land_cover` that belong to `class`
    pub fn class_mask(&self, land_cover: &GridField, class: LandCoverClass) -> Array2<bool> {
        let tolerance = self.params.match_tolerance;
        land_cover.values().mapv(|v| class.matches(v, tolerance))
    }

    /// Ratio of revised to reference factors, per land cover class and species
    ///
    /// Returns one entry per class in grid-code order, each holding one field per species
    /// in the requested order. Classes without factors for a species give a ratio of 1
    /// everywhere.
    pub fn compute_ratios(
        &self,
        land_cover: &GridField,
        species: &[Species],
    ) -> GfasResult<Vec<RatioFields>> {
        self.validate_land_cover(land_cover)?;
        self.check_species(species)?;
        let tolerance = self.params.match_tolerance;

        LandCoverClass::ALL
            .into_iter()
            .map(|class| -> GfasResult<RatioFields> {
                let fields = species
                    .iter()
                    .map(|&s| {
                        let ratio = if self.table.classes_for(s).contains(&class) {
                            self.table.ratio(s, class)?
                        } else {
                            warn!("no {} factors for {}, ratio is 1", s, class);
                            1.0
                        };
                        if !ratio.is_finite() {
                            warn!("ratio of {} factors in {} is {}", s, class, ratio);
                        }

                        let values = land_cover
                            .values()
                            .mapv(|v| if class.matches(v, tolerance) { ratio } else { 1.0 });
                        land_cover.derive(
                            self.params.output_short_name(s.code()),
                            format!("{} emission factor ratio in {}", s.report_name(), class),
                            values,
                        )
                    })
                    .collect::<GfasResult<Vec<_>>>()?;
                Ok(RatioFields { class, fields })
            })
            .collect()
    }

    /// Contribution of one land cover class to a species' emission flux
    ///
    /// Dry matter times the class factor inside the class, 0 elsewhere.
    pub fn class_contribution(
        &self,
        dry_matter: &GridField,
        land_cover: &GridField,
        factor_set: FactorSet,
        species: Species,
        class: LandCoverClass,
    ) -> GfasResult<Array2<FloatValue>> {
        self.validate_inputs(dry_matter, land_cover)?;
        let mut contribution = Array2::zeros(dry_matter.values().raw_dim());
        self.accumulate(
            &mut contribution,
            dry_matter,
            land_cover,
            factor_set,
            species,
            class,
        )?;
        Ok(contribution)
    }

    /// Emission flux fields per factor set and species
    ///
    /// Returns one entry per factor set in the requested order, each holding one field per
    /// species in the requested order. Classes are summed in grid-code order.
    pub fn compute_emissions(
        &self,
        dry_matter: &GridField,
        land_cover: &GridField,
        species: &[Species],
        factor_sets: &[FactorSet],
    ) -> GfasResult<Vec<EmissionFields>> {
        self.validate_inputs(dry_matter, land_cover)?;
        self.check_species(species)?;
        for &s in species {
            for class in self.table.missing_classes(s) {
                warn!("no {} factors for {}, its cells do not emit {}", s, class, s);
            }
        }

        factor_sets
            .iter()
            .map(|&factor_set| -> GfasResult<EmissionFields> {
                let fields = species
                    .iter()
                    .map(|&s| {
                        let mut flux = Array2::zeros(dry_matter.values().raw_dim());
                        for class in LandCoverClass::ALL {
                            self.accumulate(&mut flux, dry_matter, land_cover, factor_set, s, class)?;
                        }
                        debug!("computed {} flux of {}", factor_set, s);
                        dry_matter.derive(
                            self.params.output_short_name(s.code()),
                            format!("{} emission flux ({})", s.report_name(), factor_set),
                            flux,
                        )
                    })
                    .collect::<GfasResult<Vec<_>>>()?;
                Ok(EmissionFields { factor_set, fields })
            })
            .collect()
    }

    /// Add `dry_matter * factor` to `target` wherever `land_cover` matches `class`
    fn accumulate(
        &self,
        target: &mut Array2<FloatValue>,
        dry_matter: &GridField,
        land_cover: &GridField,
        factor_set: FactorSet,
        species: Species,
        class: LandCoverClass,
    ) -> GfasResult<()> {
        if !self.table.classes_for(species).contains(&class) {
            return Ok(());
        }
        let factor = self.table.lookup(factor_set, species, class)?;
        let tolerance = self.params.match_tolerance;

        Zip::from(target)
            .and(dry_matter.values())
            .and(land_cover.values())
            .for_each(|t, &dm, &lc| {
                if class.matches(lc, tolerance) {
                    *t += dm * factor;
                }
            });
        Ok(())
    }

    fn check_species(&self, species: &[Species]) -> GfasResult<()> {
        match species.iter().find(|s| !self.table.contains_species(**s)) {
            Some(missing) => Err(GfasError::MissingFactor {
                factor_set: "any".to_string(),
                species: missing.code().to_string(),
                land_cover: "any".to_string(),
            }),
            None => Ok(()),
        }
    }
}
