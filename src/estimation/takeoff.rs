//! Quantity takeoff: project geometry to a priced bill of materials.
//!
//! Pure and deterministic. The waste buffer is applied here and only here.

use super::currency::BASE_CURRENCY;
use super::tables::TakeoffTable;
use crate::domain::{Category, EstimateResult, EstimationMode, MaterialLine, ProjectInput};
use crate::error::EstimateError;

/// Used when neither the table nor the configuration gives a waste fraction.
const DEFAULT_WASTE_FRACTION: f64 = 0.10;

#[derive(Debug, Clone)]
pub struct TakeoffEngine {
    table: TakeoffTable,
    waste_override: Option<f64>,
}

impl TakeoffEngine {
    /// `waste_override_percent` replaces every per-category waste fraction.
    pub fn new(table: TakeoffTable, waste_override_percent: Option<f64>) -> Self {
        Self {
            table,
            waste_override: waste_override_percent.map(|p| p / 100.0),
        }
    }

    pub fn table(&self) -> &TakeoffTable {
        &self.table
    }

    pub fn waste_fraction(&self, category: Category) -> f64 {
        self.waste_override
            .or_else(|| self.table.waste_for(category))
            .unwrap_or(DEFAULT_WASTE_FRACTION)
    }

    /// Base-cost estimate in the base currency, before brands and location
    /// adjustments.
    pub fn calculate(&self, input: &ProjectInput) -> Result<EstimateResult, EstimateError> {
        let formulas = self.table.formulas(input.project_type).ok_or_else(|| {
            EstimateError::Computation(format!(
                "no takeoff formulas for project type {}",
                input.project_type
            ))
        })?;
        let level = input.quality_level;
        let detailed = input.estimation_mode == EstimationMode::Detailed;

        let lines = formulas
            .iter()
            .filter(|f| detailed || !f.detailed_only)
            .filter_map(|formula| {
                let raw = formula.per_unit.get(level) * formula.basis.measure(&input.dimensions);
                if raw == 0.0 {
                    return None;
                }
                let category = formula.category();
                let waste = self.waste_fraction(category);
                Some(MaterialLine::new(
                    formula.name.get(level).clone(),
                    category,
                    raw * (1.0 + waste),
                    formula.unit.clone(),
                    waste,
                    *formula.unit_cost.get(level),
                ))
            })
            .collect();

        Ok(EstimateResult::new(
            lines,
            self.table.cost_ratios(level),
            BASE_CURRENCY,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dimensions, Location, ProjectType, QualityLevel};
    use crate::estimation::tables::Basis;

    fn engine() -> TakeoffEngine {
        TakeoffEngine::new(TakeoffTable::bundled().unwrap(), None)
    }

    fn input(project_type: ProjectType, quality_level: QualityLevel) -> ProjectInput {
        ProjectInput {
            project_type,
            dimensions: Dimensions {
                length: 4.0,
                width: 5.0,
                height: 3.0,
            },
            location: Location::Morocco,
            quality_level,
            estimation_mode: EstimationMode::Simple,
            budget: None,
            currency: None,
        }
    }

    #[test]
    fn test_calculate_is_deterministic() {
        let engine = engine();
        let input = input(ProjectType::House, QualityLevel::Premium);

        let first = serde_json::to_string(&engine.calculate(&input).unwrap()).unwrap();
        let second = serde_json::to_string(&engine.calculate(&input).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_waste_buffer_applied_once() {
        let engine = engine();
        let input = input(ProjectType::Room, QualityLevel::Standard);
        let result = engine.calculate(&input).unwrap();

        let formulas = engine.table().formulas(ProjectType::Room).unwrap();
        let simple: Vec<_> = formulas.iter().filter(|f| !f.detailed_only).collect();
        assert_eq!(result.materials().len(), simple.len());

        for (line, formula) in result.materials().iter().zip(simple) {
            let raw = formula.per_unit.get(QualityLevel::Standard)
                * formula.basis.measure(&input.dimensions);
            let waste = engine.waste_fraction(formula.category());
            assert!((line.quantity - raw * (1.0 + waste)).abs() < 1e-9, "{}", line.name);
            assert_eq!(line.waste_fraction, waste);
        }
    }

    #[test]
    fn test_room_paint_quantity() {
        let result = engine()
            .calculate(&input(ProjectType::Room, QualityLevel::Standard))
            .unwrap();
        let paint = result
            .materials()
            .iter()
            .find(|l| l.name == "Acrylic wall paint")
            .unwrap();

        // 54 m2 of wall at 0.22 L/m2, plus 12% finishing waste
        let expected = Basis::WallArea.measure(&input(ProjectType::Room, QualityLevel::Standard).dimensions)
            * 0.22
            * 1.12;
        assert!((paint.quantity - expected).abs() < 1e-9);
        assert_eq!(paint.category, Category::Finishing);
    }

    #[test]
    fn test_foundation_coating_uses_waterproofing_waste() {
        let engine = engine();
        let result = engine
            .calculate(&input(ProjectType::Foundation, QualityLevel::Standard))
            .unwrap();
        let coating = result
            .materials()
            .iter()
            .find(|l| l.name == "Bitumen waterproofing coating")
            .unwrap();

        assert_eq!(coating.category, Category::Waterproofing);
        assert_eq!(coating.waste_fraction, engine.waste_fraction(Category::Waterproofing));
    }

    #[test]
    fn test_waste_override() {
        let engine = TakeoffEngine::new(TakeoffTable::bundled().unwrap(), Some(15.0));
        assert_eq!(engine.waste_fraction(Category::Cement), 0.15);
        assert_eq!(engine.waste_fraction(Category::Aggregate), 0.15);
    }

    #[test]
    fn test_quality_substitutes_materials() {
        let engine = engine();
        let economy = engine
            .calculate(&input(ProjectType::Roof, QualityLevel::Economy))
            .unwrap();
        let luxury = engine
            .calculate(&input(ProjectType::Roof, QualityLevel::Luxury))
            .unwrap();

        assert!(economy.materials().iter().any(|l| l.name == "Corrugated roof sheets"));
        assert!(luxury.materials().iter().any(|l| l.name == "Slate roof tiles"));
    }

    #[test]
    fn test_detailed_mode_adds_lines() {
        let engine = engine();
        for project_type in ProjectType::ALL {
            let simple = input(project_type, QualityLevel::Standard);
            let detailed = ProjectInput {
                estimation_mode: EstimationMode::Detailed,
                ..simple.clone()
            };

            let simple = engine.calculate(&simple).unwrap();
            let detailed = engine.calculate(&detailed).unwrap();
            assert!(detailed.materials().len() > simple.materials().len());
            assert!(detailed.pricing().total_cost > simple.pricing().total_cost);
        }
    }

    #[test]
    fn test_base_cost_monotonic_in_quality() {
        let engine = engine();
        for project_type in ProjectType::ALL {
            let totals: Vec<f64> = QualityLevel::ALL
                .iter()
                .map(|q| engine.calculate(&input(project_type, *q)).unwrap().pricing().total_cost)
                .collect();
            assert!(
                totals.windows(2).all(|w| w[0] <= w[1]),
                "{} totals not monotonic: {:?}",
                project_type,
                totals
            );
        }
    }

    #[test]
    fn test_every_estimate_verifies() {
        let engine = engine();
        for project_type in ProjectType::ALL {
            for quality in QualityLevel::ALL {
                let result = engine.calculate(&input(project_type, quality)).unwrap();
                assert!(!result.materials().is_empty());
                assert!(result.verify().is_ok());
                assert_eq!(result.currency(), BASE_CURRENCY);
            }
        }
    }
}
