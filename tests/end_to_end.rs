use burn::backend::{Autodiff, NdArray};
use burn::tensor::{ElementConversion, Tensor};
use pinn_solver::{
    BoundaryCondition, ConditionKind, Model, ModelConfig, OptimizerKind, PinnError, Poisson,
    ResidualLoss, SampleSet, TrainingConfig, loss_boundary, train,
};

type MyBackend = Autodiff<NdArray<f32>>;

fn source(_: &[f32]) -> f32 {
    4.0
}

/// u = x² + y² を四辺で与えるディリクレ条件
fn four_dirichlet_edges() -> Vec<BoundaryCondition> {
    let edges = [(0, 0.0), (0, 1.0), (1, 0.0), (1, 1.0)];
    edges
        .into_iter()
        .map(|(axis, value)| {
            let face = SampleSet::face(10, 2, axis, value).unwrap();
            BoundaryCondition::parse("dirichlet", face, |p: &[f32]| p[0] * p[0] + p[1] * p[1])
                .unwrap()
        })
        .collect()
}

fn losses(model: &Model<MyBackend>, samples: &SampleSet, conditions: &[BoundaryCondition]) -> (f32, f32) {
    let residual = Poisson::new(source)
        .residual(model, samples, None)
        .unwrap()
        .sum()
        .into_scalar()
        .elem::<f32>();
    let boundary = loss_boundary(model, conditions, 10.0)
        .unwrap()
        .into_scalar()
        .elem::<f32>();
    (residual, boundary)
}

fn outputs(model: &Model<MyBackend>, input: Tensor<MyBackend, 2>) -> Vec<f32> {
    model.forward(input).into_data().to_vec::<f32>().unwrap()
}

#[test_log::test]
fn one_epoch_on_unit_square_moves_both_losses() {
    let device = Default::default();
    let mut model = ModelConfig::new(2, 10).init::<MyBackend>(&device);
    let samples = SampleSet::unit_grid(10, 2).unwrap();
    let conditions = four_dirichlet_edges();

    let (residual_before, boundary_before) = losses(&model, &samples, &conditions);

    let config = TrainingConfig::new(1);
    let history = train(&mut model, &samples, &Poisson::new(source), &conditions, &config).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history.residual[0], residual_before);

    let (residual_after, boundary_after) = losses(&model, &samples, &conditions);
    for loss in [residual_after, boundary_after] {
        assert!(loss.is_finite());
        assert!(loss >= 0.0);
    }
    assert_ne!(residual_after, residual_before);
    assert_ne!(boundary_after, boundary_before);
}

#[test_log::test]
fn trained_model_is_deterministic() {
    let device = Default::default();
    let mut model = ModelConfig::new(2, 10).init::<MyBackend>(&device);
    let samples = SampleSet::unit_grid(10, 2).unwrap();
    let conditions = four_dirichlet_edges();
    let config = TrainingConfig::new(2).with_verbose(false);
    train(&mut model, &samples, &Poisson::new(source), &conditions, &config).unwrap();

    let input = samples.to_tensor::<MyBackend>(&device);
    assert_eq!(outputs(&model, input.clone()), outputs(&model, input));
}

#[test_log::test]
fn every_optimizer_trains() {
    let device = Default::default();
    let samples = SampleSet::unit_grid(5, 2).unwrap();
    let conditions = four_dirichlet_edges();
    for optimizer in [OptimizerKind::Adam, OptimizerKind::Sgd, OptimizerKind::AdaGrad] {
        let mut model = ModelConfig::new(2, 10).init::<MyBackend>(&device);
        let config = TrainingConfig::new(2)
            .with_optimizer(optimizer)
            .with_learning_rate(0.01);
        let history = train(&mut model, &samples, &Poisson::new(source), &conditions, &config).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.residual.iter().all(|l| l.is_finite() && *l >= 0.0));
        assert!(history.boundary.iter().all(|l| l.is_finite() && *l >= 0.0));
    }
}

#[test_log::test]
fn invalid_arguments_leave_the_model_untouched() {
    let device = Default::default();
    let mut model = ModelConfig::new(2, 10).init::<MyBackend>(&device);
    let samples = SampleSet::unit_grid(10, 2).unwrap();
    let conditions = four_dirichlet_edges();
    let input = samples.to_tensor::<MyBackend>(&device);
    let before = outputs(&model, input.clone());

    for config in [
        TrainingConfig::new(0),
        TrainingConfig::new(5).with_message_frequency(0),
    ] {
        let err = train(&mut model, &samples, &Poisson::new(source), &conditions, &config).unwrap_err();
        assert!(matches!(err, PinnError::InvalidArgument { .. }));
    }
    assert_eq!(before, outputs(&model, input));
}

#[test_log::test]
fn unknown_condition_kind_is_a_configuration_error() {
    let face = SampleSet::face(10, 2, 0, 0.0).unwrap();
    let err = BoundaryCondition::parse("unknown", face, |_: &[f32]| 0.0).unwrap_err();
    assert_eq!(err, PinnError::UnknownConditionKind("unknown".into()));
    assert_eq!(
        "neuman".parse::<ConditionKind>().unwrap(),
        ConditionKind::Neumann { axis: 0 }
    );
}
