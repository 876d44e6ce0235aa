mod support;

use approx::assert_relative_eq;
use genrefeat::config::ExtractorConfig;
use genrefeat::dataset::{read_dataset, CreateMode, DatasetWriter, Schema};
use genrefeat::features::FeatureExtractor;
use genrefeat::types::FeatureRecord;

use support::{silent_clip, tone_clip};

#[test]
fn written_records_read_back_within_tolerance() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = FeatureExtractor::new(ExtractorConfig::default());
    let records: Vec<FeatureRecord> = [
        silent_clip(dir.path(), "a.wav"),
        tone_clip(dir.path(), "b.wav", 440.0),
        tone_clip(dir.path(), "c, with comma.wav", 660.0),
    ]
    .iter()
    .map(|path| extractor.extract(path).unwrap())
    .collect();

    let out = dir.path().join("features.csv");
    let schema = Schema::for_mfcc(extractor.config().n_mfcc);
    let mut writer = DatasetWriter::initialize(&out, schema.clone(), CreateMode::Overwrite).unwrap();
    assert_eq!(writer.append_many(&records).unwrap(), 3);
    drop(writer);

    let dataset = read_dataset(&out).unwrap();
    assert_eq!(dataset.schema, schema);
    assert!(dataset.rows.iter().all(|row| row.len() == schema.len()));

    let parsed = dataset.records().unwrap();
    assert_eq!(parsed.len(), records.len());
    for (read, original) in parsed.iter().zip(&records) {
        assert_eq!(read.filename, original.filename);
        assert_eq!(read.label, original.label);
        for (a, b) in read.values.iter().zip(&original.values) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12, max_relative = 1e-12);
        }
    }
}

#[test]
fn append_mode_extends_previous_run() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = FeatureExtractor::new(ExtractorConfig::default());
    let schema = Schema::for_mfcc(20);
    let out = dir.path().join("features.csv");

    let first = extractor.extract(&tone_clip(dir.path(), "b.wav", 440.0)).unwrap();
    let mut writer = DatasetWriter::initialize(&out, schema.clone(), CreateMode::Overwrite).unwrap();
    writer.append(&first).unwrap();
    drop(writer);

    let second = extractor.extract(&silent_clip(dir.path(), "a.wav")).unwrap();
    let mut writer = DatasetWriter::open_append(&out, schema).unwrap();
    writer.append(&second).unwrap();
    drop(writer);

    let dataset = read_dataset(&out).unwrap();
    let names: Vec<_> = dataset.rows.iter().map(|row| row[0].as_str()).collect();
    assert_eq!(names, vec!["b.wav", "a.wav"]);
}

#[test]
fn header_line_is_canonical() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("features.csv");
    DatasetWriter::initialize(&out, Schema::for_mfcc(2), CreateMode::Overwrite).unwrap();

    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(
        text,
        "filename,length,chroma_stft_mean,chroma_stft_var,rms_mean,rms_var,\
spectral_centroid_mean,spectral_centroid_var,spectral_bandwidth_mean,spectral_bandwidth_var,\
rolloff_mean,rolloff_var,zero_crossing_rate_mean,zero_crossing_rate_var,\
harmony_mean,harmony_var,perceptr_mean,perceptr_var,tempo,\
mfcc1_mean,mfcc1_var,mfcc2_mean,mfcc2_var,label\n"
    );
}
