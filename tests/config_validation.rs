use slotlog::{
    ElementKind, HostParams, LoggerError, ParamValue, Recorder, RecorderConfig, SaveDataBlock,
};

fn message(err: LoggerError) -> String {
    match err {
        LoggerError::Configuration(msg) => msg,
        other => panic!("expected a configuration error, got {:?}", other),
    }
}

#[test]
fn standard_params_validate() {
    let params = HostParams::standard(3, [0.5, 2.0], 0.25, "run.dat", "%8.3f", 1);
    let config = params.validate().unwrap();
    assert_eq!(config.channels, 3);
    assert_eq!(config.start_time, 0.5);
    assert_eq!(config.end_time, 2.0);
    assert_eq!(config.kind, ElementKind::Single);
    assert_eq!(config.slot_count(), 7);
}

#[test]
fn kind_code_nine_is_rejected_before_allocation() {
    let params = HostParams::standard(2, [0.0, 1.0], 0.1, "run.dat", "%f", 9);
    let msg = message(params.validate().unwrap_err());
    assert!(msg.contains("between 0 and 8"), "{}", msg);
}

#[test]
fn reference_messages() {
    let cases = [
        (
            HostParams::standard(0, [0.0, 1.0], 0.1, "o", "%f", 0),
            "The number of channels must be greater than zero",
        ),
        (
            HostParams::standard(1, [1.0, 1.0], 0.1, "o", "%f", 0),
            "T_end must be greater than T_start",
        ),
        (
            HostParams::standard(1, [0.0, 1.0], 0.0, "o", "%f", 0),
            "The sampling time must be greater than zero",
        ),
    ];
    for (params, expected) in cases {
        assert_eq!(message(params.validate().unwrap_err()), expected);
    }
}

#[test]
fn negative_window_is_rejected() {
    let params = HostParams::standard(1, [-1.0, 1.0], 0.1, "o", "%f", 0);
    assert_eq!(
        message(params.validate().unwrap_err()),
        "[T_start T_end] must be non negative"
    );
}

#[test]
fn raw_parameter_shapes() {
    let mut values = vec![
        ParamValue::scalar(1.0),
        ParamValue::vector(&[0.0, 1.0]),
        ParamValue::scalar(0.1),
        ParamValue::text("o"),
        ParamValue::text("%f"),
        ParamValue::scalar(0.0),
    ];
    assert!(HostParams::new(values.clone()).validate().is_ok());

    values[1] = ParamValue::vector(&[0.0, 1.0, 2.0]);
    assert!(HostParams::new(values.clone()).validate().is_err());

    values[1] = ParamValue::Complex(vec![(0.0, 1.0), (1.0, 0.0)]);
    assert!(HostParams::new(values.clone()).validate().is_err());

    values[1] = ParamValue::vector(&[0.0, f64::INFINITY]);
    assert!(HostParams::new(values.clone()).validate().is_err());

    values[1] = ParamValue::vector(&[0.0, 1.0]);
    values[3] = ParamValue::scalar(3.0);
    assert!(HostParams::new(values.clone()).validate().is_err());

    values.pop();
    assert!(HostParams::new(values).validate().is_err());
}

#[test]
fn bad_format_is_a_configuration_error() {
    for format in ["no conversion", "%s", "%d %d", "%*d", "%n"] {
        let params = HostParams::standard(1, [0.0, 1.0], 0.1, "o", format, 0);
        assert!(
            matches!(params.validate(), Err(LoggerError::Configuration(_))),
            "{:?} accepted",
            format
        );
    }
}

#[test]
fn toml_round_trip() {
    let text = r#"
        channels = 2
        start_time = 0.0
        end_time = 5.0
        sample_period = 0.5
        kind = 6
        output_path = "signals.dat"
        format = "%d "
    "#;
    let config = RecorderConfig::from_toml_str(text).unwrap();
    assert_eq!(config.kind, ElementKind::Int32);
    assert_eq!(config.slot_count(), 11);

    let again = RecorderConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
    assert_eq!(again, config);
}

#[test]
fn toml_kind_out_of_range() {
    let text = r#"
        channels = 1
        start_time = 0.0
        end_time = 1.0
        sample_period = 0.5
        kind = 9
        output_path = "o.dat"
        format = "%f"
    "#;
    assert!(RecorderConfig::from_toml_str(text).is_err());
}

#[test]
fn toml_file_loads_and_missing_file_is_io() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logger.toml");
    std::fs::write(
        &path,
        "channels = 1\nstart_time = 0.0\nend_time = 1.0\nsample_period = 0.25\n\
         kind = 0\noutput_path = \"x.dat\"\nformat = \"%g\\n\"\n",
    )
    .unwrap();
    let config = RecorderConfig::from_toml_file(&path).unwrap();
    assert_eq!(config.format, "%g\n");

    let err = RecorderConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, LoggerError::Io { .. }));
}

#[test]
fn invalid_config_never_allocates() {
    let config = RecorderConfig {
        channels: 0,
        start_time: 0.0,
        end_time: 1.0,
        sample_period: 0.1,
        kind: ElementKind::Double,
        output_path: "o".into(),
        format: "%f".into(),
    };
    assert!(Recorder::start(config.clone()).is_err());
    assert!(SaveDataBlock::new(config).is_err());
}
