use std::fs;

use tempfile::tempdir;

use dcr2jolie::config::{AppConfig, OutputConfig};
use dcr2jolie_cli::{Args, run_with_config};

const TWO_PARTY: &str = r#"
    <dcrgraph>
      <events>
        <event id="a1">
          <custom>
            <eventData><dataType>text</dataType></eventData>
            <roles>
              <role>S:U:Alice</role>
              <role>R:Bob</role>
            </roles>
          </custom>
        </event>
        <event id="a2">
          <roles>
            <role>S:Bob</role>
            <role>R:U:Alice</role>
          </roles>
        </event>
      </events>
      <labelMappings>
        <labelMapping eventId="a1" labelId="Ask Price"/>
        <labelMapping eventId="a2" labelId="Reply"/>
      </labelMappings>
      <constraints>
        <conditions>
          <condition sourceId="a1" targetId="a2"/>
        </conditions>
      </constraints>
      <marking>
        <executed/>
        <included>
          <event id="a1"/>
          <event id="a2"/>
        </included>
        <pendingResponses/>
      </marking>
    </dcrgraph>
"#;

fn config_for(output_dir: &std::path::Path) -> AppConfig {
    AppConfig {
        output: OutputConfig::new(output_dir),
    }
}

#[test]
fn e2e_generates_one_skeleton_pair_per_role() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input_path = temp_dir.path().join("sale.xml");
    fs::write(&input_path, TWO_PARTY).expect("Failed to write input");
    let output_dir = temp_dir.path().join("generated");

    let args = Args {
        xml: input_path.to_string_lossy().to_string(),
    };
    run_with_config(&args, config_for(&output_dir)).expect("Compilation failed");

    for filename in [
        "AliceInterfaces.iol",
        "AliceService.ol",
        "BobInterfaces.iol",
        "BobService.ol",
    ] {
        assert!(
            output_dir.join(filename).is_file(),
            "{filename} was not generated"
        );
    }

    let alice_service = fs::read_to_string(output_dir.join("AliceService.ol")).unwrap();
    assert!(alice_service.contains("execution: {single}"));
    let bob_service = fs::read_to_string(output_dir.join("BobService.ol")).unwrap();
    assert!(bob_service.contains("execution: {sequential}"));
}

#[test]
fn e2e_runs_are_byte_identical() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input_path = temp_dir.path().join("sale.xml");
    fs::write(&input_path, TWO_PARTY).expect("Failed to write input");

    let args = Args {
        xml: input_path.to_string_lossy().to_string(),
    };

    let mut outputs = Vec::new();
    for round in 0..2 {
        let output_dir = temp_dir.path().join(format!("out{round}"));
        run_with_config(&args, config_for(&output_dir)).expect("Compilation failed");

        let mut files: Vec<(String, String)> = fs::read_dir(&output_dir)
            .unwrap()
            .flatten()
            .map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                let contents = fs::read_to_string(entry.path()).unwrap();
                (name, contents)
            })
            .collect();
        files.sort();
        outputs.push(files);
    }

    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[0].len(), 4);
}

#[test]
fn e2e_missing_input_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let args = Args {
        xml: temp_dir
            .path()
            .join("does_not_exist.xml")
            .to_string_lossy()
            .to_string(),
    };

    assert!(run_with_config(&args, config_for(temp_dir.path())).is_err());
}

#[test]
fn e2e_unprojectable_choreography_fails() {
    let source = TWO_PARTY
        .replace("<role>S:Bob</role>", "<role>S:Carol</role>")
        .replace("<role>R:U:Alice</role>", "<role>R:Dave</role>")
        .replace(
            r#"<condition sourceId="a1" targetId="a2"/>"#,
            r#"<condition sourceId="a1" targetId="a2"/><include sourceId="a1" targetId="a2"/>"#,
        );

    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input_path = temp_dir.path().join("broken.xml");
    fs::write(&input_path, source).expect("Failed to write input");

    let args = Args {
        xml: input_path.to_string_lossy().to_string(),
    };

    assert!(run_with_config(&args, config_for(temp_dir.path())).is_err());
}
