use phasecorr_core::{Normalization, RegistrationConfig, ReturnError, Space};

#[test]
fn test_defaults() {
    let config = RegistrationConfig::default();
    assert_eq!(config.upsample_factor, 1);
    assert_eq!(config.space, Space::Real);
    assert!(!config.disambiguate);
    assert_eq!(config.return_error, ReturnError::Enabled);
    assert_eq!(config.overlap_ratio, 0.3);
    assert_eq!(config.normalization, Normalization::Phase);
}

#[test]
fn test_toml_round_trip() {
    let config = RegistrationConfig {
        upsample_factor: 20,
        space: Space::Fourier,
        disambiguate: true,
        return_error: ReturnError::Always,
        overlap_ratio: 0.5,
        normalization: Normalization::None,
    };
    let text = toml::to_string_pretty(&config).unwrap();
    assert!(text.contains("return_error = \"always\""));
    assert!(text.contains("space = \"fourier\""));
    let parsed: RegistrationConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_partial_toml_uses_defaults() {
    let parsed: RegistrationConfig = toml::from_str(
        r#"
upsample_factor = 100
return_error = false
space = "Real"
"#,
    )
    .unwrap();
    assert_eq!(parsed.upsample_factor, 100);
    assert_eq!(parsed.return_error, ReturnError::Disabled);
    assert_eq!(parsed.space, Space::Real);
    assert_eq!(parsed.normalization, Normalization::Phase);
}

#[test]
fn test_json_return_error_forms() {
    let parsed: RegistrationConfig = serde_json::from_str(r#"{"return_error": true}"#).unwrap();
    assert_eq!(parsed.return_error, ReturnError::Enabled);
    let parsed: RegistrationConfig = serde_json::from_str(r#"{"return_error": "always"}"#).unwrap();
    assert_eq!(parsed.return_error, ReturnError::Always);
    assert!(serde_json::from_str::<RegistrationConfig>(r#"{"return_error": "sometimes"}"#).is_err());
}

#[test]
fn test_invalid_enum_values_rejected() {
    assert!(toml::from_str::<RegistrationConfig>("space = \"polar\"").is_err());
    assert!(toml::from_str::<RegistrationConfig>("normalization = \"amplitude\"").is_err());
}

#[test]
fn test_return_error_parse() {
    assert_eq!("always".parse::<ReturnError>().unwrap(), ReturnError::Always);
    assert_eq!("false".parse::<ReturnError>().unwrap(), ReturnError::Disabled);
    assert!("maybe".parse::<ReturnError>().is_err());
    assert!(!ReturnError::Disabled.wants_metrics());
    assert!(ReturnError::Always.wants_metrics());
}
