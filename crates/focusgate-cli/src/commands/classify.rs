use focusgate_core::storage::Config;
use focusgate_core::Classifier;

pub fn run(text: &str, channel: &str, sender: &str) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let config = Config::load()?;
    let classifier = Classifier::new(&config.oracle);
    let verdict = classifier.classify(text, channel, sender);
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}
