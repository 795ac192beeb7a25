//! Weather tools and prompts
//!
//! The weather data is a fixed placeholder; only the city name and the
//! timestamp vary between reports.

use chrono::Local;
use tracing::info;

use weather_core::{
    BoundArguments, CapabilityDescriptor, HandlerResult, Message, ParamSpec, ParamType, ParamValue,
    Registry, RegistryError, ReturnKind,
};

/// Every capability the server exposes, in declaration order
pub fn catalog() -> Result<Vec<CapabilityDescriptor>, RegistryError> {
    Ok(vec![
        CapabilityDescriptor::tool("get_weather")
            .description(
                "Get current weather information for a specified city. \
                 Returns temperature data for the requested location.",
            )
            .param(
                ParamSpec::required("city", ParamType::String)
                    .describe("Name of the city to get weather for (e.g. 'New York')"),
            )
            .returns(ReturnKind::Text)
            .handler(get_weather)
            .build()?,
        CapabilityDescriptor::prompt("weather_inquiry")
            .description("Template for asking about the weather conditions in a specific location.")
            .param(
                ParamSpec::required("location", ParamType::String)
                    .describe("The city or location to inquire about"),
            )
            .returns(ReturnKind::Text)
            .handler(weather_inquiry)
            .build()?,
        CapabilityDescriptor::prompt("weather_travel_advice")
            .description("Template for getting weather-based travel advice for a destination.")
            .param(ParamSpec::required("destination", ParamType::String).describe("Travel destination city"))
            .param(
                ParamSpec::optional("travel_date", ParamType::String, ParamValue::Unspecified)
                    .allow_empty(true)
                    .describe("Planned travel date (optional)"),
            )
            .returns(ReturnKind::Messages)
            .handler(weather_travel_advice)
            .build()?,
    ])
}

/// Register the catalog into a fresh registry
pub fn build_registry() -> Result<Registry, RegistryError> {
    Registry::from_descriptors(catalog()?)
}

/// Placeholder weather report for a city
pub fn get_weather(args: &BoundArguments) -> HandlerResult {
    let city = args.get_str("city").ok_or("city argument is missing")?;
    info!(city, "processing weather request");

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    let report = format!(
        "Weather Report for {city}\n\
         ========================\n\
         Current Temperature: 83F\n\
         Conditions: Clear\n\
         Humidity: 65%\n\
         Wind: Light breeze\n\
         Last Updated: {timestamp}\n\
         \n"
    );

    info!(city, "returning weather data");
    Ok(report.into())
}

pub fn weather_inquiry(args: &BoundArguments) -> HandlerResult {
    let location = args.get_str("location").ok_or("location argument is missing")?;
    Ok(format!(
        "I need current weather information for {location}. Please provide the temperature \
         and any relevant weather conditions. If you need to use a tool to get this \
         information, please do so."
    )
    .into())
}

pub fn weather_travel_advice(args: &BoundArguments) -> HandlerResult {
    let destination = args.get_str("destination").ok_or("destination argument is missing")?;

    // An empty date reads the same as no date
    let date_info = match args.get_str("travel_date") {
        Some(date) if !date.is_empty() => format!(" for travel on {date}"),
        _ => " for current conditions".to_string(),
    };

    let text = format!(
        "I'm planning to travel to {destination}{date_info}. Please check the current weather \
         conditions and provide advice on what to pack and any weather-related conditions for \
         my trip. Use the weather tool to get current temperature data."
    );
    Ok(vec![Message::user(text)].into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::{ArgumentBinder, CapabilityKind, Role};

    fn bind(kind: CapabilityKind, name: &str, raw: serde_json::Value) -> BoundArguments {
        let registry = build_registry().unwrap();
        let descriptor = registry.lookup(kind, name).unwrap();
        ArgumentBinder::bind(descriptor, raw.as_object().unwrap()).unwrap()
    }

    #[test]
    fn test_catalog_registers_in_order() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.len(), 3);

        let prompts: Vec<&str> = registry
            .list(CapabilityKind::Prompt)
            .iter()
            .map(|d| d.name())
            .collect();
        assert_eq!(prompts, vec!["weather_inquiry", "weather_travel_advice"]);
    }

    #[test]
    fn test_weather_report_format() {
        let args = bind(CapabilityKind::Tool, "get_weather", serde_json::json!({"city": " Boston "}));
        let output = get_weather(&args).unwrap();
        let report = output.as_text().unwrap();

        assert!(report.starts_with("Weather Report for Boston\n========================\n"));
        assert!(report.contains("Current Temperature: 83F\n"));
        assert!(report.contains("Humidity: 65%\n"));
        assert!(report.contains("Last Updated: "));
        assert!(report.ends_with("\n\n"));
    }

    #[test]
    fn test_weather_inquiry_text() {
        let args = bind(CapabilityKind::Prompt, "weather_inquiry", serde_json::json!({"location": "Paris"}));
        let output = weather_inquiry(&args).unwrap();
        assert!(output
            .as_text()
            .unwrap()
            .starts_with("I need current weather information for Paris."));
    }

    #[test]
    fn test_travel_advice_without_date() {
        let args = bind(
            CapabilityKind::Prompt,
            "weather_travel_advice",
            serde_json::json!({"destination": "Reykjavik"}),
        );
        let output = weather_travel_advice(&args).unwrap();
        let messages = output.as_messages().unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert!(messages[0]
            .content
            .starts_with("I'm planning to travel to Reykjavik for current conditions."));
    }

    #[test]
    fn test_travel_advice_blank_date_reads_as_no_date() {
        let args = bind(
            CapabilityKind::Prompt,
            "weather_travel_advice",
            serde_json::json!({"destination": "Oslo", "travel_date": "  "}),
        );
        assert_eq!(args.get_str("travel_date"), Some(""));

        let output = weather_travel_advice(&args).unwrap();
        assert!(output.as_messages().unwrap()[0]
            .content
            .starts_with("I'm planning to travel to Oslo for current conditions."));
    }

    #[test]
    fn test_travel_advice_with_date() {
        let args = bind(
            CapabilityKind::Prompt,
            "weather_travel_advice",
            serde_json::json!({"destination": "Reykjavik", "travel_date": "2026-12-20"}),
        );
        let output = weather_travel_advice(&args).unwrap();
        assert!(output.as_messages().unwrap()[0]
            .content
            .contains("Reykjavik for travel on 2026-12-20."));
    }
}
