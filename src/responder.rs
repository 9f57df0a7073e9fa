use std::time::Duration;

use anyhow::Result;
use rand::seq::IndexedRandom;

/// Fixed delay standing in for network latency
const RESPONSE_DELAY: Duration = Duration::from_millis(1000);

const CANNED_RESPONSES: [&str; 6] = [
    "Je suis une IA futuriste conçue pour vous aider. Comment puis-je vous assister aujourd'hui?",
    "Votre question est intéressante. Laissez-moi y réfléchir un instant...",
    "D'après mes analyses, je peux vous proposer plusieurs solutions à ce problème.",
    "Je n'ai pas toutes les informations nécessaires pour répondre avec précision. Pourriez-vous me donner plus de détails?",
    "Cette technologie est encore en développement, mais je peux vous donner un aperçu de son fonctionnement actuel.",
    "Excellente question! Voici ce que je peux vous dire à ce sujet...",
];

/// Simulated assistant backend.
///
/// Same call shape as a real client: text in, future of text out, fallible.
/// The input is accepted but does not influence the reply; swapping this for
/// an actual API client leaves the caller unchanged.
#[derive(Debug, Clone)]
pub struct SimulatedClient {
    delay: Duration,
}

impl SimulatedClient {
    pub fn new() -> Self {
        Self {
            delay: RESPONSE_DELAY,
        }
    }

    pub async fn respond(&self, _input: &str) -> Result<String> {
        tokio::time::sleep(self.delay).await;

        let reply = CANNED_RESPONSES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(CANNED_RESPONSES[0]);
        Ok(reply.to_string())
    }
}

impl Default for SimulatedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_respond_returns_a_canned_reply() {
        let client = SimulatedClient::new();
        let reply = client.respond("peu importe").await.unwrap();
        assert!(CANNED_RESPONSES.contains(&reply.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_respond_waits_for_the_fixed_delay() {
        let client = SimulatedClient::new();
        let start = tokio::time::Instant::now();
        client.respond("bonjour").await.unwrap();
        assert!(start.elapsed() >= RESPONSE_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_does_not_change_the_reply_set() {
        let client = SimulatedClient::new();
        for input in ["", "a", "une question très longue et détaillée"] {
            let reply = client.respond(input).await.unwrap();
            assert!(CANNED_RESPONSES.contains(&reply.as_str()));
        }
    }
}
