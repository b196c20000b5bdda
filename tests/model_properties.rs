use epicurve::{
    ModelError, ModelKind, ModelParameters, ModelState, ParamName, Rk4Solver, SimulationResult,
    SolverSettings,
};

fn demographic_params(beta: f64, gamma: f64, mu: f64, n: f64) -> ModelParameters {
    ModelParameters::new(beta, gamma).with(ParamName::Mu, mu).with(ParamName::N, n)
}

fn trajectory_for(
    kind: ModelKind,
    params: &ModelParameters,
    y0: ModelState,
    settings: SolverSettings,
) -> SimulationResult {
    let model = kind.model();
    let rates = model.resolve(params).expect("resolve params");
    Rk4Solver::new().solve(|y| model.derivatives(y, &rates), y0, settings)
}

#[test]
fn basic_sir_conserves_total_population() {
    let cases = [
        (0.3, 0.1, ModelState::new(0.99, 0.01, 0.0)),
        (2.0, 0.5, ModelState::new(0.5, 0.3, 0.2)),
        (0.05, 1.0, ModelState::new(0.9, 0.1, 0.0)),
    ];
    for (beta, gamma, y0) in cases {
        let params = ModelParameters::new(beta, gamma);
        let res = trajectory_for(ModelKind::BasicSir, &params, y0, SolverSettings::default());
        for (t, s, i, r) in res.rows() {
            let total = s + i + r;
            assert!((total - 1.0).abs() < 1e-5, "beta={beta} gamma={gamma} t={t}: total {total}");
        }
    }
}

#[test]
fn basic_sir_epidemic_burns_out_when_r0_above_one() {
    let res = trajectory_for(
        ModelKind::BasicSir,
        &ModelParameters::new(0.3, 0.1),
        ModelState::new(0.99, 0.01, 0.0),
        SolverSettings::default(),
    );
    let summary = res.summary().expect("summary");
    assert!(summary.peak_infected > 0.2, "peak {}", summary.peak_infected);
    assert!(summary.peak_time > 0.0 && summary.peak_time < 100.0);
    assert!(summary.final_infected < summary.peak_infected);
    assert!(summary.final_recovered > 0.8);
}

#[test]
fn natural_demographics_keeps_population_constant() {
    let model = ModelKind::NaturalDemographics.model();
    let params = demographic_params(0.4, 0.1, 0.02, 1000.0);
    for y in [ModelState::new(990.0, 10.0, 0.0), ModelState::new(300.0, 200.0, 500.0)] {
        let d = model.compute_derivatives(&y, &params).expect("derivatives");
        assert!(d.total().abs() < 1e-9, "d/dt total = {}", d.total());
    }
}

#[test]
fn natural_demographics_settles_at_endemic_equilibrium() {
    // R0 = 0.5 / 0.15; S* = N / R0, I* = mu N (N - S*) / (beta S*)
    let params = demographic_params(0.5, 0.1, 0.05, 1000.0);
    let res = trajectory_for(
        ModelKind::NaturalDemographics,
        &params,
        ModelState::new(990.0, 10.0, 0.0),
        SolverSettings::demographic(),
    );
    let last = res.last_state().expect("last state");
    assert!((last.s - 300.0).abs() < 1.0, "S* = {}", last.s);
    assert!((last.i - 233.333_333).abs() < 1.0, "I* = {}", last.i);
    assert!((last.total() - 1000.0).abs() < 1e-6);
}

#[test]
fn disease_deaths_population_declines_at_alpha_i() {
    let model = ModelKind::DiseaseDeaths.model();
    let alpha = 0.05;
    let params = demographic_params(0.4, 0.1, 0.02, 1000.0).with(ParamName::Alpha, alpha);
    let states = [
        ModelState::new(990.0, 10.0, 0.0),
        ModelState::new(400.0, 350.0, 250.0),
        ModelState::new(100.0, 1.0, 700.0),
    ];
    for y in states {
        let d = model.compute_derivatives(&y, &params).expect("derivatives");
        assert!(
            (d.total() + alpha * y.i).abs() < 1e-9,
            "d/dt total = {}, expected {}",
            d.total(),
            -alpha * y.i
        );
        assert!(d.total() < 0.0);
    }

    let no_infection = ModelState::new(800.0, 0.0, 200.0);
    let d = model.compute_derivatives(&no_infection, &params).expect("derivatives");
    assert!(d.total().abs() < 1e-12);
}

#[test]
fn disease_deaths_integrated_population_shrinks() {
    let params = demographic_params(0.4, 0.1, 0.02, 1000.0).with(ParamName::Alpha, 0.05);
    let res = trajectory_for(
        ModelKind::DiseaseDeaths,
        &params,
        ModelState::new(990.0, 10.0, 0.0),
        SolverSettings::demographic(),
    );
    let summary = res.summary().expect("summary");
    assert!(summary.final_population < 1000.0);
    assert!(summary.final_population > 0.0);
}

#[test]
fn r0_orders_by_removal_terms() {
    let params = demographic_params(0.5, 0.1, 0.02, 1000.0).with(ParamName::Alpha, 0.03);
    let basic = ModelKind::BasicSir.model().calculate_r0(&params).unwrap();
    let natural = ModelKind::NaturalDemographics.model().calculate_r0(&params).unwrap();
    let deaths = ModelKind::DiseaseDeaths.model().calculate_r0(&params).unwrap();
    assert!((basic - 5.0).abs() < 1e-12);
    assert!((natural - 0.5 / 0.12).abs() < 1e-12);
    assert!((deaths - 0.5 / 0.15).abs() < 1e-12);
    assert!(deaths < natural && natural < basic);
}

#[test]
fn r0_is_infinite_with_no_removal() {
    let params = demographic_params(0.5, 0.0, 0.0, 1000.0);
    let r0 = ModelKind::NaturalDemographics.model().calculate_r0(&params).expect("r0");
    assert_eq!(r0, f64::INFINITY);
}

#[test]
fn missing_parameter_is_a_configuration_error() {
    let params = ModelParameters::new(0.3, 0.1).with(ParamName::N, 1000.0);
    let model = ModelKind::NaturalDemographics.model();

    let err = model
        .compute_derivatives(&ModelState::new(990.0, 10.0, 0.0), &params)
        .unwrap_err();
    assert_eq!(
        err,
        ModelError::MissingParameter { model: "natural_demographics", parameter: ParamName::Mu }
    );
    assert!(err.to_string().contains("requires parameter 'mu'"));
    assert!(model.calculate_r0(&params).is_err());
}
