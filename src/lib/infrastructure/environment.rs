//! Build metadata supplied by the CI system

use clap::Parser;

use crate::domain::notification::BuildMetadata;

/// Build metadata from environment variables, overridable on the command line
#[derive(Clone, Default, Debug, Parser)]
pub struct BuildEnvironment {
    /// The build name
    #[arg(long, env = "BUILD_NAME", default_value = "")]
    pub build_name: String,

    /// The job the build belongs to
    #[arg(long, env = "BUILD_JOB_NAME", default_value = "")]
    pub build_job_name: String,

    /// The pipeline the job belongs to
    #[arg(long, env = "BUILD_PIPELINE_NAME", default_value = "")]
    pub build_pipeline_name: String,

    /// The team owning the pipeline
    #[arg(long, env = "BUILD_TEAM_NAME", default_value = "")]
    pub build_team_name: String,

    /// The external URL of the CI web interface
    #[arg(long, env = "ATC_EXTERNAL_URL", default_value = "")]
    pub external_url: String,
}

impl From<BuildEnvironment> for BuildMetadata {
    fn from(env: BuildEnvironment) -> Self {
        Self {
            build_name: env.build_name,
            build_job_name: env.build_job_name,
            build_pipeline_name: env.build_pipeline_name,
            build_team_name: env.build_team_name,
            external_url: env.external_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_command_line_values_become_metadata() -> TestResult {
        let env = BuildEnvironment::try_parse_from([
            "out",
            "--build-name",
            "42",
            "--build-job-name",
            "deploy",
            "--build-pipeline-name",
            "main",
            "--build-team-name",
            "platform",
            "--external-url",
            "https://ci.example.com",
        ])?;

        let metadata = BuildMetadata::from(env);

        assert_eq!(metadata.build_name, "42");
        assert_eq!(metadata.build_job_name, "deploy");
        assert_eq!(metadata.build_pipeline_name, "main");
        assert_eq!(metadata.build_team_name, "platform");
        assert_eq!(metadata.external_url, "https://ci.example.com");

        Ok(())
    }
}
