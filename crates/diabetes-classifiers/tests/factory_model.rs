use diabetes_classifiers::config::{ModelConfig, ModelType};
use diabetes_classifiers::math::Array2;
use diabetes_classifiers::models::factory;

fn tiny_dataset() -> (Array2<f32>, Vec<u8>) {
    let x = Array2::from_shape_vec(
        (8, 2),
        vec![
            1.0, 0.0, // class 1
            0.0, 1.0, // class 0
            1.0, 0.1, // class 1
            0.0, 0.9, // class 0
            1.1, 0.0, // class 1
            0.0, 1.2, // class 0
            0.9, 0.2, // class 1
            0.1, 1.1, // class 0
        ],
    )
    .expect("failed to create feature matrix");
    let y = vec![1, 0, 1, 0, 1, 0, 1, 0];
    (x, y)
}

#[test]
fn test_factory_builds_random_forest() {
    let (x, y) = tiny_dataset();
    let params = ModelConfig::new(ModelType::RandomForest {
        n_estimators: 15,
        max_depth: None,
        min_samples_split: 2,
        min_samples_leaf: 1,
    });

    let mut model = factory::build_model(&params, 7);
    assert!(!model.is_fitted());
    model.fit(&x, &y).unwrap();
    assert!(model.is_fitted());

    let probs = model.predict_proba(&x).unwrap();
    assert_eq!(probs.len(), x.nrows());
    assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    assert_eq!(model.predict(&x).unwrap(), y);
}

#[test]
fn test_factory_builds_gbdt() {
    let (x, y) = tiny_dataset();
    let params = ModelConfig::new(ModelType::GBDT {
        learning_rate: 0.1,
        max_depth: 3,
        num_boost_round: 10,
        training_optimization_level: 2,
    });

    let mut model = factory::build_model(&params, 7);
    model.fit(&x, &y).unwrap();

    let probs = model.predict_proba(&x).unwrap();
    assert_eq!(probs.len(), x.nrows());
    assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
}

#[test]
fn test_state_restores_identical_predictions() {
    let (x, y) = tiny_dataset();
    let gbdt = "gbdt".parse::<ModelType>().map(ModelConfig::new).unwrap();
    for params in [ModelConfig::default(), gbdt] {
        let mut model = factory::build_model(&params, 3);
        model.fit(&x, &y).unwrap();

        let json = serde_json::to_string(&model.state().unwrap()).unwrap();
        let restored = serde_json::from_str::<diabetes_classifiers::models::ModelState>(&json)
            .unwrap()
            .into_model();

        assert_eq!(restored.name(), model.name());
        let before = model.predict_proba(&x).unwrap();
        let after = restored.predict_proba(&x).unwrap();
        for (a, b) in before.iter().zip(&after) {
            assert!((a - b).abs() < 1e-6, "{} vs {}", a, b);
        }
    }
}
