use citeflow_llm::{GenerationOptions, GenerationRequest};

#[test]
fn test_request_creation() {
    let request = GenerationRequest::new("What is X?");

    assert_eq!(request.prompt, "What is X?");
    assert!(request.instructions.is_none());
    assert_eq!(request.options, GenerationOptions::default());
}

#[test]
fn test_request_with_options() {
    let options = GenerationOptions::new().temperature(0.3).max_output_tokens(100);
    let request = GenerationRequest::new("Hello").with_options(options);

    assert_eq!(request.options.temperature, 0.3);
    assert_eq!(request.options.max_output_tokens, 100);
}

#[test]
fn test_default_options() {
    let options = GenerationOptions::default();
    assert_eq!(options.temperature, 0.7);
    assert_eq!(options.max_output_tokens, 1024);
}

#[test]
fn test_temperature_is_clamped() {
    assert_eq!(GenerationOptions::new().temperature(1.7).temperature, 1.0);
    assert_eq!(GenerationOptions::new().temperature(-0.5).temperature, 0.0);
    assert_eq!(GenerationOptions::new().temperature(f32::NAN).temperature, 0.0);
}

#[test]
fn test_request_keeps_instructions_separate() {
    let bare = GenerationRequest::new("Body");
    assert!(bare.instructions.is_none());

    let with_instructions = GenerationRequest::new("Body").with_instructions("Rules");
    assert_eq!(with_instructions.instructions.as_deref(), Some("Rules"));
    assert_eq!(with_instructions.prompt, "Body");
}

#[test]
fn test_options_serde() {
    let options = GenerationOptions::new().max_output_tokens(64);
    let json = serde_json::to_string(&options).unwrap();
    let back: GenerationOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, options);
}

#[test]
fn test_effective_temperature_clamps_deserialized_options() {
    let options: GenerationOptions =
        serde_json::from_str(r#"{"temperature": 3.5, "max_output_tokens": 64}"#).unwrap();
    assert_eq!(options.temperature, 3.5);
    assert_eq!(options.effective_temperature(), 1.0);
}
