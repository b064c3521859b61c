use std::collections::HashSet;
use std::sync::Arc;

use veracity::analysis::tokenize;
use veracity::error::{Result, VeracityError};
use veracity::ml::classifier::{ClassifierConfig, ModelType, PredictInput, PredictOutput, build_classifier};
use veracity::ml::config::PipelineConfig;
use veracity::ml::evaluation::evaluate;
use veracity::ml::labels::LabelCodec;
use veracity::ml::pipeline::{Pipeline, PipelineState};
use veracity::ml::registry::SessionRegistry;
use veracity::ml::split::{DatasetSplitter, SplitRatios};
use veracity::ml::types::LabeledText;
use veracity::ml::vectorizer::TfIdfVectorizer;

const DOCUMENTS: [&str; 4] = [
    "good news today",
    "fake scandal exposed",
    "great news update",
    "scandal is fake",
];
const LABELS: [&str; 4] = ["real", "fake", "real", "fake"];

fn records() -> Vec<LabeledText> {
    DOCUMENTS
        .iter()
        .zip(LABELS)
        .map(|(text, label)| LabeledText::new(*text, label))
        .collect()
}

/// Train on every record so the scenario does not depend on the shuffle.
fn train_on_everything() -> Result<PipelineConfig> {
    Ok(PipelineConfig::default().with_split(SplitRatios::new(1.0, 0.0)?))
}

async fn trained_pipeline(model_type: ModelType, config: PipelineConfig) -> Result<Pipeline> {
    let mut pipeline = Pipeline::new(model_type, config)?;
    pipeline.load_data(records())?;
    pipeline.fit().await?;
    Ok(pipeline)
}

#[tokio::test]
async fn knn_with_single_neighbour_recovers_real() -> Result<()> {
    let mut config = train_on_everything()?;
    config.classifier.knn.k = 1;

    let pipeline = trained_pipeline(ModelType::Knn, config).await?;
    assert_eq!(pipeline.predict("good news today")?.label, "real");
    Ok(())
}

#[tokio::test]
async fn knn_with_default_k_recovers_real() -> Result<()> {
    let pipeline = trained_pipeline(ModelType::Knn, train_on_everything()?).await?;
    assert_eq!(pipeline.predict("good news today")?.label, "real");
    assert_eq!(pipeline.predict("scandal is fake")?.label, "fake");
    Ok(())
}

#[tokio::test]
async fn decision_tree_recovers_training_labels() -> Result<()> {
    let pipeline = trained_pipeline(ModelType::DecisionTree, train_on_everything()?).await?;
    for (text, label) in DOCUMENTS.iter().zip(LABELS) {
        assert_eq!(pipeline.predict(text)?.label, label);
    }
    Ok(())
}

#[tokio::test]
async fn every_model_type_completes_a_cycle() -> Result<()> {
    let mut corpus = records();
    for i in 0..20 {
        corpus.push(LabeledText::new(format!("official update number {i} confirmed"), "real"));
        corpus.push(LabeledText::new(format!("shocking hoax {i} exposed"), "fake"));
    }

    for model_type in ModelType::ALL {
        let config = PipelineConfig::default().with_seed(17);
        let mut pipeline = Pipeline::new(model_type, config)?;
        let report = pipeline.train_and_evaluate(corpus.clone()).await?;

        assert_eq!(pipeline.state(), PipelineState::Evaluated);
        assert_eq!(report.summary.model_type, model_type);
        assert_eq!(
            report.summary.train_size + report.summary.validation_size + report.summary.test_size,
            corpus.len()
        );
        assert_eq!(report.metrics.total(), report.summary.test_size);
        for value in [
            report.metrics.accuracy,
            report.metrics.precision,
            report.metrics.recall,
            report.metrics.f1_score,
        ] {
            assert!((0.0..=1.0).contains(&value));
        }

        let label = pipeline.predict("shocking hoax exposed")?.label;
        assert!(label == "real" || label == "fake");
    }
    Ok(())
}

#[test]
fn vectorizer_nonzero_positions_match_document_tokens() -> Result<()> {
    let mut vectorizer = TfIdfVectorizer::new()?;
    vectorizer.fit(&DOCUMENTS)?;

    let distinct: HashSet<String> = DOCUMENTS.iter().flat_map(|doc| tokenize(doc)).collect();
    assert_eq!(vectorizer.vocabulary_size(), distinct.len());

    for doc in DOCUMENTS {
        let vector = vectorizer.transform(doc)?;
        assert_eq!(vector.len(), vectorizer.vocabulary_size());

        let nonzero: HashSet<usize> = vector
            .iter()
            .enumerate()
            .filter(|(_, value)| **value != 0.0)
            .map(|(idx, _)| idx)
            .collect();
        let expected: HashSet<usize> = tokenize(doc)
            .iter()
            .filter(|token| vectorizer.idf(token).is_some_and(|idf| idf != 0.0))
            .filter_map(|token| vectorizer.vocabulary_index(token))
            .collect();
        assert_eq!(nonzero, expected, "mismatch for '{doc}'");
    }
    Ok(())
}

#[test]
fn idf_does_not_depend_on_transform_order() -> Result<()> {
    let mut vectorizer = TfIdfVectorizer::new()?;
    vectorizer.fit(&DOCUMENTS)?;
    let before: Vec<Option<f64>> = vectorizer.terms().iter().map(|t| vectorizer.idf(t)).collect();

    let forward = vectorizer.transform_batch(&DOCUMENTS)?;
    let mut reversed_docs = DOCUMENTS;
    reversed_docs.reverse();
    let mut backward = vectorizer.transform_batch(&reversed_docs)?;
    backward.reverse();

    let after: Vec<Option<f64>> = vectorizer.terms().iter().map(|t| vectorizer.idf(t)).collect();
    assert_eq!(before, after);
    assert_eq!(forward, backward);
    Ok(())
}

#[test]
fn transform_before_fit_is_uninitialized() -> Result<()> {
    let vectorizer = TfIdfVectorizer::new()?;
    assert!(matches!(
        vectorizer.transform("good news"),
        Err(VeracityError::Uninitialized(_))
    ));
    Ok(())
}

#[tokio::test]
async fn predict_before_fit_is_uninitialized() -> Result<()> {
    for model_type in ModelType::ALL {
        let classifier = build_classifier(model_type, &ClassifierConfig::default())?;
        assert!(matches!(
            classifier.predict(PredictInput::Single(&[0.0, 1.0])),
            Err(VeracityError::Uninitialized(_))
        ));

        let pipeline = Pipeline::new(model_type, PipelineConfig::default())?;
        assert!(matches!(
            pipeline.predict("good news today"),
            Err(VeracityError::Uninitialized(_))
        ));
    }
    Ok(())
}

#[tokio::test]
async fn classifier_predict_shapes_follow_input() -> Result<()> {
    let mut vectorizer = TfIdfVectorizer::new()?;
    let features = vectorizer.fit_transform(&DOCUMENTS)?;
    let codec = LabelCodec::default();
    let codes: Vec<u8> = LABELS.iter().filter_map(|label| codec.encode(label)).collect();

    let mut classifier = build_classifier(ModelType::Knn, &ClassifierConfig::default())?;
    classifier.fit(&features, &codes).await?;

    assert!(matches!(
        classifier.predict(PredictInput::Single(&features[0]))?,
        PredictOutput::Single(1)
    ));
    assert_eq!(
        classifier.predict(PredictInput::Batch(&features))?,
        PredictOutput::Batch(codes.clone())
    );
    assert!(matches!(
        classifier.predict(PredictInput::Batch(&[vec![1.0]])),
        Err(VeracityError::TypeMismatch(_))
    ));
    Ok(())
}

#[test]
fn split_partitions_are_disjoint_and_exhaustive() -> Result<()> {
    let items: Vec<usize> = (0..57).collect();
    let labels: Vec<u8> = items.iter().map(|i| (i % 2) as u8).collect();

    for (train, validation) in [(0.7, 0.1), (0.6, 0.2), (0.0, 1.0), (1.0, 0.0), (0.25, 0.25)] {
        let splitter = DatasetSplitter::new(SplitRatios::new(train, validation)?);
        let split = splitter.split(items.clone(), labels.clone())?;

        assert_eq!(split.len(), items.len());
        let mut seen = HashSet::new();
        for partition in [&split.train, &split.validation, &split.test] {
            for (&item, &label) in partition.items.iter().zip(&partition.labels) {
                assert_eq!(label, (item % 2) as u8);
                assert!(seen.insert(item));
            }
        }
        assert_eq!(seen.len(), items.len());
    }
    Ok(())
}

#[test]
fn evaluation_reference_values() -> Result<()> {
    let metrics = evaluate(&[1, 1, 0, 0], &[1, 0, 0, 1])?;
    assert_eq!(metrics.confusion.true_positives, 1);
    assert_eq!(metrics.confusion.false_positives, 1);
    assert_eq!(metrics.confusion.true_negatives, 1);
    assert_eq!(metrics.confusion.false_negatives, 1);
    assert_eq!(metrics.accuracy, 0.5);
    assert_eq!(metrics.precision, 0.5);
    assert_eq!(metrics.recall, 0.5);
    assert_eq!(metrics.f1_score, 0.5);

    assert_eq!(evaluate(&[], &[])?.accuracy, 0.0);
    Ok(())
}

#[test]
fn label_round_trip() -> Result<()> {
    let codec = LabelCodec::default();
    for label in ["real", "fake"] {
        let code = codec.encode(label).expect("known label");
        assert_eq!(codec.decode(code)?, label);
    }
    assert_eq!(codec.encode("real"), Some(1));
    assert_eq!(codec.encode("fake"), Some(0));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn registry_trains_sessions_concurrently() -> Result<()> {
    let registry = Arc::new(SessionRegistry::new());

    let mut handles = Vec::new();
    for model_type in [ModelType::Knn, ModelType::DecisionTree, ModelType::Knn] {
        let registry = Arc::clone(&registry);
        let id = registry.open(model_type, train_on_everything()?)?;
        handles.push(tokio::spawn(async move {
            registry.train(&id, records()).await.map(|report| (id, report))
        }));
    }

    for handle in handles {
        let (id, report) = handle.await.expect("training task panicked")?;
        assert_eq!(report.summary.train_size, DOCUMENTS.len());
        assert_eq!(registry.predict(&id, "good news today").await?.label, "real");
    }

    assert_eq!(registry.len(), 3);
    for id in registry.session_ids() {
        registry.close(&id)?;
    }
    assert!(registry.is_empty());
    Ok(())
}

#[tokio::test]
async fn dropped_records_do_not_abort_training() -> Result<()> {
    let mut corpus = records();
    corpus.push(LabeledText::new("", "real"));
    corpus.push(LabeledText::new("clickbait headline", "satire"));

    let mut pipeline = Pipeline::new(ModelType::Knn, train_on_everything()?)?;
    let loaded = pipeline.load_data(corpus)?;
    assert_eq!(loaded.accepted, 4);
    assert_eq!(loaded.dropped, 2);

    pipeline.fit().await?;
    assert_eq!(pipeline.vocabulary_size(), Some(9));
    Ok(())
}

#[tokio::test]
async fn all_invalid_records_is_no_valid_data() -> Result<()> {
    let mut pipeline = Pipeline::new(ModelType::Knn, PipelineConfig::default())?;
    let result = pipeline.load_data(vec![
        LabeledText::new("   ", "real"),
        LabeledText::new("text", "maybe"),
    ]);
    assert!(matches!(result, Err(VeracityError::NoValidData(_))));
    assert!(matches!(
        pipeline.fit().await,
        Err(VeracityError::InvalidState(_))
    ));
    Ok(())
}
