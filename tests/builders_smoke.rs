use std::path::Path;

use plgspl::{Config, Question, Schema};

#[test]
fn question_builder_takes_iterables() {
    let question = Question::builder()
        .id("pool/a")
        .ordinal(4)
        .variants(["pool/a", "pool/b"].map(String::from))
        .parts(["x", "y"].map(String::from))
        .expected_files(["main.py", "main.py"].map(String::from))
        .build();

    assert!(question.is_group());
    assert_eq!(question.parts().len(), 2);
    assert_eq!(question.expected_files().len(), 1);
    assert_eq!(question.identifiers().collect::<Vec<_>>(), ["pool/a", "pool/b"]);
    assert!(question.files().is_empty());
}

#[test]
fn config_builder_accepts_paths() {
    let cfg = Config::builder().output_dir("/tmp/plgspl-out").pages_per_pdf(30).build();
    assert_eq!(cfg.output_dir(), Path::new("/tmp/plgspl-out"));
    assert_eq!(cfg.pages_per_pdf(), 30);
}

#[test]
fn schema_overview_serializes() {
    let mut schema = Schema::new();
    schema
        .add_question(
            Question::builder()
                .id("q1")
                .ordinal(1)
                .parts(["a".to_string()])
                .build(),
        )
        .expect("insert");

    let value = serde_json::to_value(schema.overview()).expect("serialize overview");
    assert!(value.is_array());
    assert_eq!(value[0]["id"], "q1");
    assert_eq!(value[0]["parts"], "a");
}
