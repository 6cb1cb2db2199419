use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedUser<T> {
    pub matched_user: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct PublicProfile {
    pub username: Option<String>,
    pub profile: Option<ProfileDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetails {
    pub user_avatar: Option<String>,
    pub real_name: Option<String>,
    pub about_me: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedProblems {
    pub profile: Option<RankingProfile>,
    pub submit_stats_global: Option<SubmitStats>,
}

#[derive(Debug, Deserialize)]
pub struct RankingProfile {
    pub ranking: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStats {
    #[serde(default)]
    pub ac_submission_num: Vec<DifficultyCount>,
}

#[derive(Debug, Deserialize)]
pub struct DifficultyCount {
    pub difficulty: String,
    pub count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarUser {
    pub user_calendar: Option<UserCalendar>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCalendar {
    /// A JSON object encoded as a string: `{"<unix seconds>": count}`.
    pub submission_calendar: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsApiResponse {
    pub status: String,
    pub message: Option<String>,
    #[serde(default)]
    pub total_solved: u32,
    #[serde(default)]
    pub easy_solved: u32,
    #[serde(default)]
    pub medium_solved: u32,
    #[serde(default)]
    pub hard_solved: u32,
    pub ranking: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolvedCounts {
    pub total: u32,
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
    pub ranking: Option<u64>,
}

impl From<StatsApiResponse> for SolvedCounts {
    fn from(response: StatsApiResponse) -> Self {
        Self {
            total: response.total_solved,
            easy: response.easy_solved,
            medium: response.medium_solved,
            hard: response.hard_solved,
            ranking: response.ranking,
        }
    }
}

impl From<SolvedProblems> for SolvedCounts {
    fn from(solved: SolvedProblems) -> Self {
        let mut counts = SolvedCounts {
            ranking: solved.profile.and_then(|p| p.ranking),
            ..Default::default()
        };
        let buckets = solved
            .submit_stats_global
            .map(|s| s.ac_submission_num)
            .unwrap_or_default();
        for bucket in buckets {
            match bucket.difficulty.as_str() {
                "All" => counts.total = bucket.count,
                "Easy" => counts.easy = bucket.count,
                "Medium" => counts.medium = bucket.count,
                "Hard" => counts.hard = bucket.count,
                _ => {}
            }
        }
        counts
    }
}
