use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

use crate::api::{
    ACTIONS_PER_ROUND, ActionProvider, ActionRequest, ProposedAction, ProviderError,
};

/// Picks a valid action for every slot from what the request offers.
///
/// Useful offline: every proposal names a real waypoint, a clip the character
/// owns, or an existing peer, so generation never fails on content.
#[derive(Debug)]
pub struct RandomProvider {
    rng: Mutex<StdRng>,
}

impl RandomProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    fn pick(request: &ActionRequest, rng: &mut StdRng) -> ProposedAction {
        match rng.gen_range(0..4) {
            0 => request.waypoints.choose(rng).map(ProposedAction::goto),
            1 => request.animations.choose(rng).map(ProposedAction::animation),
            2 => request
                .peers
                .choose(rng)
                .map(|peer| ProposedAction::talk_to(peer.name.as_str())),
            _ => None,
        }
        .unwrap_or(ProposedAction::Wander)
    }
}

#[async_trait]
impl ActionProvider for RandomProvider {
    async fn propose_actions(
        &self,
        request: &ActionRequest,
    ) -> Result<Vec<ProposedAction>, ProviderError> {
        let mut rng = self.rng.lock().await;
        Ok((0..ACTIONS_PER_ROUND)
            .map(|_| Self::pick(request, &mut rng))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use game_core::{Character, CharacterId, Vec2};

    use super::*;
    use crate::api::{CharacterBrief, PeerBrief};

    fn request() -> ActionRequest {
        let me = Character::new(CharacterId(1), "Monet", Vec2::ORIGIN);
        let peer = Character::new(CharacterId(2), "Swift", Vec2::new(3.0, 0.0));
        ActionRequest {
            character: CharacterBrief::from(&me),
            peers: vec![PeerBrief::from(&peer)],
            waypoints: vec!["cafe".to_string(), "plaza".to_string()],
            animations: vec!["Wave".to_string()],
        }
    }

    #[tokio::test]
    async fn proposes_a_full_round_of_valid_actions() {
        let provider = RandomProvider::new(7);
        let request = request();

        for _ in 0..20 {
            let actions = provider.propose_actions(&request).await.unwrap();
            assert_eq!(actions.len(), ACTIONS_PER_ROUND);
            for action in actions {
                match action {
                    ProposedAction::Goto { checkpoint } => {
                        assert!(request.waypoints.contains(&checkpoint))
                    }
                    ProposedAction::Animation { animation } => assert_eq!(animation, "Wave"),
                    ProposedAction::TalkTo { target_name } => assert_eq!(target_name, "Swift"),
                    ProposedAction::Wander => {}
                }
            }
        }
    }

    #[tokio::test]
    async fn same_seed_same_proposals() {
        let request = request();
        let a = RandomProvider::new(42).propose_actions(&request).await.unwrap();
        let b = RandomProvider::new(42).propose_actions(&request).await.unwrap();
        assert_eq!(a, b);
    }
}
