//! Team member data: remote JSON with a built-in fallback.

use shared::TeamMember;

/// Used when no remote source is configured or it fails
pub fn fallback_team() -> Vec<TeamMember> {
    let member = |name: &str, role: &str, bio: &str, image: &str| TeamMember {
        name: name.to_string(),
        role: role.to_string(),
        bio: bio.to_string(),
        image: image.to_string(),
    };
    vec![
        member(
            "Elena Marsh",
            "Founder & Principal Designer",
            "Leads every project from first sketch to final styling.",
            "/images/team/elena.jpg",
        ),
        member(
            "Daniel Okafor",
            "Senior Interior Architect",
            "Space planning, joinery and technical drawings.",
            "/images/team/daniel.jpg",
        ),
        member(
            "Sofia Lind",
            "Lighting Designer",
            "Layered lighting schemes for homes and hospitality.",
            "/images/team/sofia.jpg",
        ),
        member(
            "Marco Ruiz",
            "Project Manager",
            "Keeps contractors, budgets and schedules on track.",
            "/images/team/marco.jpg",
        ),
    ]
}

/// Remote list when `url` is set and answers with a non-empty list,
/// otherwise the fallback.
pub async fn load_team(client: &reqwest::Client, url: Option<&str>) -> Vec<TeamMember> {
    let Some(url) = url else {
        return fallback_team();
    };
    match fetch(client, url).await {
        Ok(members) if !members.is_empty() => members,
        Ok(_) => {
            tracing::warn!("Team data at {url} is empty, using fallback");
            fallback_team()
        }
        Err(e) => {
            tracing::warn!("Team data fetch from {url} failed: {e}");
            fallback_team()
        }
    }
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<Vec<TeamMember>, reqwest::Error> {
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<TeamMember>>()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_complete() {
        let team = fallback_team();
        assert_eq!(team.len(), 4);
        assert!(team.iter().all(|m| !m.name.is_empty() && !m.role.is_empty()));
    }

    #[tokio::test]
    async fn test_no_url_uses_fallback() {
        let team = load_team(&reqwest::Client::new(), None).await;
        assert_eq!(team, fallback_team());
    }

    #[tokio::test]
    async fn test_unreachable_url_uses_fallback() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{addr}/team.json");
        let team = load_team(&reqwest::Client::new(), Some(&url)).await;
        assert_eq!(team, fallback_team());
    }
}
