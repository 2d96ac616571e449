//! Physical plausibility of the B-dot model over dilute-to-moderate solutions.

use ge_activity::{ActivityModel, DebyeHuckelBdot, IonicStrengthCalculator};
use ge_database::{DatabaseBuilder, ModelDatabase, Species};
use proptest::prelude::*;

fn nacl_db() -> ModelDatabase {
    let mut b = DatabaseBuilder::new(vec![25.0]);
    b.add_basis(Species::aqueous("H2O", 0.0));
    b.add_basis(Species::aqueous("Na+", 1.0).with_radius(4.0));
    b.add_basis(Species::aqueous("Cl-", -1.0).with_radius(3.0));
    b.add_basis(Species::aqueous("SO4--", -2.0).with_radius(4.0));
    b.add_equilibrium(
        Species::aqueous("NaCl", 0.0).with_radius(4.0),
        &[("Na+", 1.0), ("Cl-", 1.0)],
        &[0.777],
    );
    b.build().unwrap()
}

proptest! {
    #[test]
    fn charged_coefficients_lie_below_one(
        na in 1.0e-6_f64..0.5,
        cl in 1.0e-6_f64..0.5,
        so4 in 0.0_f64..0.1,
        nacl in 0.0_f64..0.1,
    ) {
        let db = nacl_db();
        let ionic = IonicStrengthCalculator::default();
        let mut model = DebyeHuckelBdot::default();
        let basis = [1.0, na, cl, so4];
        let eqm = [nacl];
        model.set_internal_parameters(25.0, &db, &basis, &eqm, &ionic);

        let mut basis_gamma = vec![0.0; 4];
        let mut eqm_gamma = vec![0.0; 1];
        model.build_activity_coefficients(&db, &mut basis_gamma, &mut eqm_gamma);

        prop_assert_eq!(basis_gamma[0], 1.0);
        for g in &basis_gamma[1..] {
            prop_assert!(*g > 0.0 && *g < 1.0, "gamma = {}", g);
        }
        prop_assert!(basis_gamma[3] < basis_gamma[1]);
        prop_assert_eq!(eqm_gamma[0], 1.0);

        let aw = model.water_activity();
        prop_assert!(aw > 0.95 && aw < 1.0, "a_w = {}", aw);
    }
}
