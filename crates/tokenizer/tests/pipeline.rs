//! Preprocess -> train -> encode -> decode, end to end.

use shabda_core::text::special::VERSE_MARKERS;
use shabda_core::{BpeModel, GraphemeSegmenter, WordSplitter};
use shabda_sandhi::{PreprocessConfig, VersePreprocessor};
use shabda_tokenizer::BpeTokenizer;
use shabda_training::{BpeVocabTrainer, PairCounter, TrainingConfig};

const VERSES: [&str; 4] = [
    "धर्मक्षेत्रे कुरुक्षेत्रे समवेता युयुत्सवः।",
    "मामकाः पाण्डवाश्चैव किमकुर्वत सञ्जय॥",
    "रामो राजमणिः सदा विजयते रामं रमेशं भजे।",
    "रामेणाभिहता निशाचरचमू रामाय तस्मै नमः॥",
];

fn corpus() -> Vec<String> {
    let config = PreprocessConfig::default().with_max_combinations(Some(8));
    let preprocessor = VersePreprocessor::from_config(&config);
    VERSES
        .iter()
        .flat_map(|verse| preprocessor.process_line(verse).collect::<Vec<_>>())
        .collect()
}

fn training_config() -> TrainingConfig {
    TrainingConfig::default()
        .with_target_vocab_size(120)
        .with_min_pair_frequency(2)
}

fn train(lines: &[String]) -> BpeModel {
    BpeVocabTrainer::new(training_config())
        .train(lines)
        .unwrap()
        .model
}

fn words(lines: &[String]) -> Vec<String> {
    let splitter = WordSplitter::new(VERSE_MARKERS).unwrap();
    lines
        .iter()
        .flat_map(|line| splitter.split(line))
        .map(String::from)
        .collect()
}

/// The word's final segmentation, obtained by running the learned merges
/// through the training counter in order.
fn replay(model: &BpeModel, word: &str) -> Vec<String> {
    let mut counter = PairCounter::new(
        model.special().clone(),
        GraphemeSegmenter::new(training_config().segmentation),
    )
    .unwrap();
    counter.add_word(word);

    for (left, right) in model.merges().pairs() {
        if let (Some(a), Some(b)) = (counter.symbol_id(left), counter.symbol_id(right)) {
            counter.merge_pair((a, b));
        }
    }

    let mut symbols: Vec<String> = counter
        .word_symbols(0)
        .unwrap()
        .into_iter()
        .map(String::from)
        .collect();
    if symbols.last().map(String::as_str) == Some(model.eos_marker()) {
        symbols.pop();
    }
    symbols
}

#[test]
fn test_preprocessed_corpus_has_markers() {
    let lines = corpus();
    assert!(!lines.is_empty());
    assert!(lines.iter().any(|l| l.ends_with("<DANDA>")));
    assert!(lines.iter().any(|l| l.ends_with("<DANDA2>")));
}

#[test]
fn test_training_words_encode_to_training_segmentation() {
    let lines = corpus();
    let model = train(&lines);
    let mut tokenizer = BpeTokenizer::new(model.clone()).unwrap();

    assert!(!model.merges().is_empty());

    for word in words(&lines) {
        let encoded: Vec<String> = tokenizer
            .encode_word(&word)
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(encoded, replay(&model, &word), "word {:?}", word);
    }
}

#[test]
fn test_round_trip_training_lines() {
    let lines = corpus();
    let model = train(&lines);
    let unk = model.vocab().unk_id();
    let mut tokenizer = BpeTokenizer::new(model).unwrap();

    for line in &lines {
        let ids = tokenizer.encode(line).unwrap();
        assert!(unk.map_or(true, |unk| !ids.contains(&unk)), "line {:?}", line);

        let expected = words(std::slice::from_ref(line)).join(" ");
        assert_eq!(tokenizer.decode(&ids), expected);
    }
}

#[test]
fn test_unseen_character_maps_to_unk() {
    let lines = corpus();
    let mut tokenizer = BpeTokenizer::new(train(&lines)).unwrap();

    let ids = tokenizer.encode("ङ").unwrap();
    assert_eq!(ids.first().copied(), tokenizer.token_to_id("<UNK>"));
    assert_eq!(tokenizer.decode(&ids), "<UNK>");
}

#[test]
fn test_saved_model_encodes_identically() {
    let lines = corpus();
    let mut tokenizer = BpeTokenizer::new(train(&lines)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model").join("shabda.json");
    tokenizer.save(&path).unwrap();

    let mut loaded = BpeTokenizer::load(&path).unwrap();
    assert_eq!(loaded.vocab_size(), tokenizer.vocab_size());
    assert_eq!(loaded.model().merges().len(), tokenizer.model().merges().len());

    for line in &lines {
        assert_eq!(loaded.encode(line).unwrap(), tokenizer.encode(line).unwrap());
    }
}
