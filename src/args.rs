use crate::config_file::Profile;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;

pub type QueryParam = (String, String);

fn parse_param(s: &str) -> Result<QueryParam, String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{}`", s))?;

    if key.is_empty() {
        return Err(format!("invalid KEY=value: empty key in `{}`", s));
    }

    Ok((key.to_owned(), value.to_owned()))
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Lists surveys owned or shared with the authenticated user. More: <https://api.surveymonkey.com/v3/docs#api-endpoints-get-surveys>
    Surveys {
        /// Query parameter passed to the API, e.g. `-p per_page=50`
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<QueryParam>,
    },
    /// Lists collectors of a survey
    Collectors {
        survey_id: String,

        /// Query parameter passed to the API, e.g. `-p include=type`
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<QueryParam>,
    },
    /// Lists full expanded responses of a collector, including answers to all questions
    Responses {
        collector_id: String,

        /// Query parameter passed to the API, e.g. `-p status=completed`
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<QueryParam>,
    },
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Command,

    /// Profile from ~/.surveymonkey/config.toml to take defaults from
    #[arg(long, env = "SURVEYMONKEY_PROFILE")]
    pub profile: Option<String>,

    /// OAuth 2.0 Client Identifier <https://www.rfc-editor.org/rfc/rfc6749#section-2.2>
    #[arg(long, env = "SURVEYMONKEY_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth 2.0 Client Secret. Please use `--prompt-client-secret`, because it's not get stored in a shell history.  <https://www.rfc-editor.org/rfc/rfc6749#section-2.3.1>
    #[arg(long, env = "SURVEYMONKEY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Asks for the OAuth 2.0 Client Secret on the terminal
    #[arg(long, conflicts_with = "client_secret")]
    pub prompt_client_secret: bool,

    /// SurveyMonkey API base url
    #[arg(long, env = "SURVEYMONKEY_API_BASE")]
    pub api_base: Option<String>,

    /// Token cache file. Defaults to ~/.surveymonkey.json
    #[arg(long, env = "SURVEYMONKEY_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,

    /// Authenticate again even if a cached token exists
    #[arg(short, long)]
    pub force: bool,

    /// Enables debug logging
    #[arg(short, long)]
    pub debug: bool,
}

impl Arguments {
    /// Fills the values not given on the command line or in the environment from `profile`.
    pub fn with_profile(mut self, profile: Profile) -> Arguments {
        self.client_id = self.client_id.or(profile.client_id);
        self.client_secret = self.client_secret.or(profile.client_secret);
        self.api_base = self.api_base.or(profile.api_base);
        self.cache_file = self.cache_file.or(profile.cache_file);

        self
    }
}

pub struct Args;

impl Args {
    pub fn parse() -> Arguments {
        dotenv().ok();

        Arguments::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_responses_with_params() {
        let args = Arguments::try_parse_from([
            "surveymonkey-api",
            "responses",
            "123",
            "-p",
            "per_page=100",
            "--param",
            "sort_order=DESC",
        ])
        .unwrap();

        assert_eq!(
            args.command,
            Command::Responses {
                collector_id: "123".to_owned(),
                params: vec![
                    ("per_page".to_owned(), "100".to_owned()),
                    ("sort_order".to_owned(), "DESC".to_owned()),
                ],
            }
        );
    }

    #[test]
    fn it_keeps_equal_signs_in_param_values() {
        assert_eq!(
            parse_param("title=a=b").unwrap(),
            ("title".to_owned(), "a=b".to_owned())
        );
    }

    #[test]
    fn it_rejects_malformed_params() {
        assert!(parse_param("no-separator").is_err());
        assert!(parse_param("=value").is_err());
        assert!(
            Arguments::try_parse_from(["surveymonkey-api", "surveys", "-p", "oops"]).is_err()
        );
    }

    #[test]
    fn it_rejects_secret_together_with_prompt() {
        assert!(
            Arguments::try_parse_from([
                "surveymonkey-api",
                "--client-secret",
                "secret",
                "--prompt-client-secret",
                "surveys",
            ])
            .is_err()
        );
    }

    #[test]
    fn it_prefers_given_values_over_profile() {
        let args = Arguments::try_parse_from([
            "surveymonkey-api",
            "--client-id",
            "from-cli",
            "collectors",
            "42",
        ])
        .unwrap()
        .with_profile(Profile {
            client_id: Some("from-profile".to_owned()),
            client_secret: Some("profile-secret".to_owned()),
            api_base: None,
            cache_file: Some(PathBuf::from("/tmp/cache.json")),
        });

        assert_eq!(args.client_id.as_deref(), Some("from-cli"));
        assert_eq!(args.client_secret.as_deref(), Some("profile-secret"));
        assert_eq!(args.api_base, None);
        assert_eq!(args.cache_file, Some(PathBuf::from("/tmp/cache.json")));
    }
}
