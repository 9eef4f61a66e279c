use std::fs;

use lyric_topics::{
    error::PipelineError,
    topics::{
        cluster::{
            cluster_embeddings, exact_clusters, topic_name, topic_table, Vocabulary, OUTLIER_TOPIC,
        },
        compare::{self, compare, CompareJob},
        excerpts::{self, model_topics, ExcerptTopicJob},
        refine::{self, clean_theme, is_usable, RefineJob},
        TopicRow,
    },
};
use tempfile::TempDir;

fn row(topic: i64, count: usize, name: &str) -> TopicRow {
    TopicRow {
        topic,
        count,
        name: name.into(),
    }
}

#[test]
fn cleaning_strips_markers_and_punctuation() {
    assert_eq!(clean_theme("1. Sofrimento por amor."), "sofrimento por amor");
    assert_eq!(clean_theme("2- Festa e bebida"), "festa e bebida");
    assert_eq!(clean_theme("3) Fé"), "fé");
    assert_eq!(clean_theme("• Saudade"), "saudade");
    assert_eq!(clean_theme("* \"Ostentação\"!"), "ostentação");
    assert_eq!(clean_theme("- Traição"), "traição");
}

#[test]
fn filler_and_short_lines_are_dropped() {
    assert!(is_usable("sofrimento por amor"));
    assert!(!is_usable("amor"));
    assert!(!is_usable("aqui estao os temas"));
    assert!(!is_usable("here are five topics"));
    assert!(!is_usable("futebol de várzea"));

    let refined = refine::refine(["1. Saudade da terra natal", "Here are 5 topics:", "Amor"]);
    assert_eq!(refined.kept, vec!["saudade da terra natal"]);
    assert_eq!(refined.removed, vec!["here are 5 topics", "amor"]);
}

#[test]
fn identical_themes_share_a_cluster() {
    let themes: Vec<String> = ["festa", "amor", "festa", "fé"].iter().map(|s| s.to_string()).collect();
    assert_eq!(exact_clusters(&themes), vec![0, 1, 0, 2]);
}

#[test]
fn similar_vectors_cluster_together() {
    let embeddings = vec![vec![1.0, 0.0, 0.0], vec![0.99, 0.01, 0.0], vec![0.0, 1.0, 0.0]];
    let clusters = cluster_embeddings(&embeddings, 0.85);
    assert_eq!(clusters[0], clusters[1]);
    assert_ne!(clusters[0], clusters[2]);
}

#[test]
fn small_clusters_fold_into_outliers() {
    let themes: Vec<String> = ["festa e bebida", "festa e bebida", "festa e bebida", "amor", "fé", "fé"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let assignments = exact_clusters(&themes);
    let table = topic_table(&themes, &assignments, 2);
    assert_eq!(
        table,
        vec![
            row(OUTLIER_TOPIC, 1, "-1_amor"),
            row(0, 3, "0_festa_bebida"),
            row(1, 2, "1_fé"),
        ]
    );
}

#[test]
fn names_use_most_frequent_words() {
    let name = topic_name(4, &["saudade de casa", "saudade da mãe", "casa vazia"]);
    assert_eq!(name, "4_saudade_casa_de_da");
}

#[test]
fn comparison_reports_deltas() {
    let baseline = vec![row(-1, 40, "-1_x"), row(0, 30, "0_a"), row(1, 30, "1_b")];
    let variant = vec![row(-1, 20, "-1_x"), row(0, 50, "0_a"), row(1, 20, "1_b"), row(2, 10, "2_c")];
    let cmp = compare(&baseline, &variant);
    assert_eq!(cmp.baseline.topics, 3);
    assert_eq!(cmp.baseline.documents, 100);
    assert_eq!(cmp.baseline.outliers, 40);
    assert_eq!(cmp.variant.top.len(), 3);
    assert_eq!(cmp.topic_delta, 1);
    assert_eq!(cmp.outlier_delta, -20);
    assert!((cmp.baseline.outlier_pct() - 40.0).abs() < 1e-9);
}

#[test]
fn refine_job_writes_topic_table() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("temas.csv");
    fs::write(
        &input,
        "tema\n1. Festa e bebida\nFesta e bebida.\nHere are the topics\n- festa e bebida\nFé\n",
    )
    .expect("fixture");
    let output = dir.path().join("topics.csv");
    let topics = refine::run(&RefineJob {
        input,
        output: output.clone(),
        min_topic_size: 2,
    })
    .expect("refine runs");
    assert_eq!(topics, vec![row(0, 3, "0_festa_bebida")]);
    let written = fs::read_to_string(output).expect("output");
    assert_eq!(written, "Topic,Count,Name\n0,3,0_festa_bebida\n");
}

#[test]
fn compare_job_needs_topic_columns() {
    let dir = TempDir::new().expect("tempdir");
    let good = dir.path().join("good.csv");
    let bad = dir.path().join("bad.csv");
    fs::write(&good, "Topic,Count,Name\n-1,5,-1_x\n0,3,0_a\n").expect("fixture");
    fs::write(&bad, "Topic,Name\n0,0_a\n").expect("fixture");

    let err = compare::run(&CompareJob {
        baseline: good.clone(),
        variant: bad,
    })
    .expect_err("should fail");
    assert!(matches!(err, PipelineError::MissingColumn { ref column, .. } if column == "Count"));

    let same = compare::run(&CompareJob {
        baseline: good.clone(),
        variant: good,
    })
    .expect("compare runs");
    assert_eq!(same.topic_delta, 0);
    assert_eq!(same.baseline.outliers, 5);
}

fn chorus_documents() -> Vec<String> {
    let mut docs = vec!["Oh eu te amo saudade".to_string(); 3];
    docs.push("festa única".to_string());
    docs
}

#[test]
fn vocabulary_drops_stopwords_and_rare_words() {
    let docs = chorus_documents();
    let vocabulary = Vocabulary::build(&docs, &["eu", "te"], 2);
    assert!(vocabulary.admits("saudade"));
    assert!(!vocabulary.admits("eu"));
    assert!(!vocabulary.admits("festa"));
    assert!(Vocabulary::unrestricted().admits("festa"));
}

#[test]
fn baseline_names_keep_every_word() {
    let table = model_topics(&chorus_documents(), 2, false);
    assert_eq!(
        table,
        vec![row(OUTLIER_TOPIC, 1, "-1_festa_única"), row(0, 3, "0_oh_eu_te_amo")]
    );
}

#[test]
fn stopword_names_skip_fillers_and_single_excerpt_words() {
    let table = model_topics(&chorus_documents(), 2, true);
    assert_eq!(table, vec![row(OUTLIER_TOPIC, 1, "-1"), row(0, 3, "0_amo_saudade")]);
}

#[test]
fn excerpt_topic_job_writes_topic_table() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("limpo.csv");
    fs::write(
        &input,
        "tag_musica,tag_trecho,letra\n\
         musica1,musica1_excerpt1,Oh eu te amo saudade\n\
         musica2,musica2_excerpt1,Oh eu te amo saudade\n\
         musica2,musica2_excerpt2,\n\
         musica3,musica3_excerpt1,Oh eu te amo saudade\n",
    )
    .expect("fixture");
    let output = dir.path().join("out/topics.csv");
    let topics = excerpts::run(&ExcerptTopicJob {
        input,
        output: output.clone(),
        min_topic_size: 3,
        stopwords: true,
    })
    .expect("topic modeling runs");
    assert_eq!(topics, vec![row(0, 3, "0_amo_saudade")]);
    let written = fs::read_to_string(output).expect("output");
    assert_eq!(written, "Topic,Count,Name\n0,3,0_amo_saudade\n");
}
