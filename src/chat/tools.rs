// ABOUTME: Weather tool offered to the language model and its execution
// ABOUTME: Declares the get_weather_for_location schema and turns tool calls into tool result messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::external::{WeatherLookup, WeatherRecord};
use crate::llm::{ChatMessage, FunctionDeclaration, ToolCall, ToolDefinition};

/// Name of the only tool the model may call
pub const WEATHER_TOOL_NAME: &str = "get_weather_for_location";

/// Schema of the weather tool
#[must_use]
pub fn weather_tool() -> ToolDefinition {
    ToolDefinition::function(FunctionDeclaration {
        name: WEATHER_TOOL_NAME.to_owned(),
        description: "Get the current weather for a city. Use this whenever the user asks \
                      about weather, temperature or conditions somewhere."
            .to_owned(),
        parameters: json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City name, e.g. Paris or New York"
                }
            },
            "required": ["location"]
        }),
    })
}

#[derive(Deserialize)]
struct WeatherToolArgs {
    location: String,
}

/// Human-readable weather summary handed back to the model
#[must_use]
pub fn weather_summary(city: &str, record: &WeatherRecord) -> String {
    format!(
        "Weather in {city}: {}, {}°C (feels like {}°C), humidity {}%, wind speed {} m/s.",
        record.description, record.temp, record.feels_like, record.humidity, record.wind_speed
    )
}

/// Tool result text when no weather could be obtained
#[must_use]
pub fn weather_unavailable(city: &str) -> String {
    format!("Weather data not available for {city}.")
}

fn parse_location(arguments: &str) -> Result<String, String> {
    let args: WeatherToolArgs = serde_json::from_str(arguments)
        .map_err(|e| format!("Error: invalid arguments for {WEATHER_TOOL_NAME}: {e}"))?;
    let location = args.location.trim();
    if location.is_empty() {
        return Err(format!(
            "Error: {WEATHER_TOOL_NAME} requires a non-empty location"
        ));
    }
    Ok(location.to_owned())
}

/// Execute one tool call and wrap the outcome as a `tool` message
///
/// Never fails: unknown tools, malformed arguments and unavailable weather
/// all become result text the model can read.
pub async fn execute_tool_call(
    call: &ToolCall,
    weather: &dyn WeatherLookup,
    deadline: Duration,
) -> ChatMessage {
    if call.function_name() != WEATHER_TOOL_NAME {
        warn!(tool = call.function_name(), "Model requested unknown tool");
        return ChatMessage::tool_result(
            call,
            format!("Error: unknown tool '{}'", call.function_name()),
        );
    }

    let city = match parse_location(call.arguments()) {
        Ok(city) => city,
        Err(message) => {
            warn!(tool_call_id = %call.id, "{message}");
            return ChatMessage::tool_result(call, message);
        }
    };

    info!(tool_call_id = %call.id, city = %city, "Executing weather tool");
    let record = match timeout(deadline, weather.fetch(&city)).await {
        Ok(record) => record,
        Err(_) => {
            warn!(city = %city, "Weather tool timed out");
            None
        }
    };

    let content = record.map_or_else(
        || weather_unavailable(&city),
        |record| weather_summary(&city, &record),
    );
    debug!(tool_call_id = %call.id, "Tool result: {content}");
    ChatMessage::tool_result(call, content)
}
