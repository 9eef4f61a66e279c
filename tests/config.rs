use std::{fs, path::PathBuf, time::Duration};

use lyric_topics::{
    cli::{classify, themes},
    config::{latest_csv, stamped_file_name, Settings},
};
use tempfile::TempDir;

#[test]
fn stamped_names_carry_a_timestamp() {
    let name = stamped_file_name("musicas_por_trechos");
    assert!(name.starts_with("musicas_por_trechos_2"));
    assert!(name.ends_with(".csv"));
    // stem + '_' + YYYYmmdd_HHMMSS + ".csv"
    assert_eq!(name.len(), "musicas_por_trechos".len() + 1 + 15 + 4);
}

#[test]
fn latest_csv_honours_prefix_and_filter() {
    let dir = TempDir::new().expect("tempdir");
    for name in [
        "musicas_por_trechos_20251027_180724.csv",
        "musicas_por_trechos_limpo_20251116_112423.csv",
        "musicas_por_trechos_20251027_180724.txt",
        "outro.csv",
    ] {
        fs::write(dir.path().join(name), "x\n").expect("fixture");
    }
    let found = latest_csv(dir.path(), "musicas_por_trechos_2", |name| !name.contains("limpo"))
        .expect("a match");
    assert_eq!(
        found.file_name().and_then(|n| n.to_str()),
        Some("musicas_por_trechos_20251027_180724.csv")
    );
    assert!(latest_csv(dir.path(), "temas", |_| true).is_none());
}

fn settings(delay_ms: u64) -> Settings {
    Settings {
        data_dir: PathBuf::from("data"),
        outputs_dir: PathBuf::from("outputs"),
        llm_base_url: "http://localhost:11434".into(),
        llm_model: "llama3:8b".into(),
        llm_request_delay_ms: delay_ms,
    }
}

#[test]
fn request_delay_paces_both_model_stages() {
    let settings = settings(250);
    let themes = themes::Args {
        input: None,
        output: None,
        iterations: 3,
        batch_size: 20,
        themes_per_batch: 5,
        seed: Some(7),
    }
    .plan(&settings);
    assert_eq!(themes.delay, Duration::from_millis(250));
    assert_eq!(themes.iterations, 3);
    assert_eq!(themes.seed, Some(7));

    let classify = classify::Args {
        input: None,
        output: None,
        sample: 50,
        seed: 42,
        inferences: 4,
    }
    .plan(&settings);
    assert_eq!(classify.delay, Duration::from_millis(250));
    assert_eq!(classify.inferences, 4);
}

#[test]
fn outputs_join_under_the_outputs_dir() {
    assert_eq!(
        settings(0).join_output("temas.csv"),
        PathBuf::from("outputs").join("temas.csv")
    );
}
