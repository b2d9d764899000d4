//! Pages command

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use serde_json::Value;

use crate::api::models::{PagesDeployment, PagesProject};
use crate::api::{encode_segment, ApiResponse, Session};
use crate::cli::{render, Context};
use crate::output::{self, Table};

#[derive(Args, Debug)]
pub struct PagesArgs {
    #[command(subcommand)]
    pub command: PagesCommand,
}

#[derive(Subcommand, Debug)]
pub enum PagesCommand {
    /// List all Pages projects
    List,

    /// Show project details
    Info {
        /// Project name
        project: String,
    },

    /// Delete a Pages project
    Delete {
        /// Project name
        project: String,
    },

    /// Inspect deployments of a project
    Deployment {
        #[command(subcommand)]
        command: DeploymentCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum DeploymentCommand {
    /// List deployments for a project
    List {
        /// Project name
        project: String,
    },

    /// Show deployment details
    Info {
        /// Project name
        project: String,

        /// Deployment ID
        deployment_id: String,
    },
}

pub async fn execute(ctx: &mut Context, args: PagesArgs) -> Result<()> {
    let session = ctx.session()?;
    let account_id = ctx.account_id(&session).await?;
    let projects = format!("/accounts/{}/pages/projects", account_id);

    match args.command {
        PagesCommand::List => {
            let value: Value = session
                .client()
                .get(&projects)
                .await
                .context("failed to list pages projects")?
                .into_result()?;

            render(ctx.format, value, |projects: Vec<PagesProject>| {
                if projects.is_empty() {
                    output::info("No Pages projects found.");
                    return;
                }

                let mut table = Table::new(&["NAME", "SUBDOMAIN", "DOMAINS", "CREATED_ON"]);
                for project in projects {
                    table.row(vec![
                        project.name,
                        project.subdomain,
                        project.domains.len().to_string(),
                        output::format_timestamp(project.created_on.as_deref(), output::DATE),
                    ]);
                }
                table.print();
            })?;
        }

        PagesCommand::Info { project } => {
            let value: Value = session
                .client()
                .get(&project_path(&projects, &project))
                .await
                .context("failed to get pages project")?
                .into_result()?;

            render(ctx.format, value, |project: PagesProject| {
                output::print_details(
                    "Pages Project Information:",
                    &[
                        ("Name", project.name),
                        ("Subdomain", pages_dev_host(&project.subdomain)),
                        (
                            "Created On",
                            output::format_timestamp(project.created_on.as_deref(), output::DATE_TIME),
                        ),
                    ],
                );
                output::print_list("Domains:", &project.domains, "No custom domains configured");
            })?;
        }

        PagesCommand::Delete { project } => {
            let _: ApiResponse<Value> = session
                .client()
                .delete(&project_path(&projects, &project))
                .await
                .context("failed to delete pages project")?;

            output::success(&format!("Pages project '{}' deleted successfully", project));
        }

        PagesCommand::Deployment { command } => {
            execute_deployment(ctx, &session, &projects, command).await?
        }
    }

    Ok(())
}

async fn execute_deployment(
    ctx: &Context,
    session: &Session,
    projects: &str,
    command: DeploymentCommand,
) -> Result<()> {
    match command {
        DeploymentCommand::List { project } => {
            let value: Value = session
                .client()
                .get(&format!("{}/deployments", project_path(projects, &project)))
                .await
                .context("failed to list pages deployments")?
                .into_result()?;

            render(ctx.format, value, |deployments: Vec<PagesDeployment>| {
                if deployments.is_empty() {
                    output::info("No deployments found.");
                    return;
                }

                let mut table = Table::new(&["ID", "ENVIRONMENT", "STATUS", "CREATED_ON"]);
                for deployment in &deployments {
                    table.row(vec![
                        output::truncate(&deployment.id, 12),
                        deployment.environment.clone(),
                        output::status(deployment.status()),
                        output::format_timestamp(deployment.created_on.as_deref(), output::DATE_TIME),
                    ]);
                }
                table.print();
            })?;
        }

        DeploymentCommand::Info {
            project,
            deployment_id,
        } => {
            let value: Value = session
                .client()
                .get(&format!(
                    "{}/deployments/{}",
                    project_path(projects, &project),
                    encode_segment(&deployment_id)
                ))
                .await
                .context("failed to get deployment info")?
                .into_result()?;

            render(ctx.format, value, |deployment: PagesDeployment| {
                let status = output::status(deployment.status());
                output::print_details(
                    "Deployment Information:",
                    &[
                        ("ID", deployment.id),
                        ("Environment", deployment.environment),
                        ("Status", status),
                        ("URL", deployment.url),
                        (
                            "Created On",
                            output::format_timestamp(deployment.created_on.as_deref(), output::DATE_TIME),
                        ),
                    ],
                );
            })?;
        }
    }

    Ok(())
}

fn project_path(projects: &str, project: &str) -> String {
    format!("{}/{}", projects, encode_segment(project))
}

fn pages_dev_host(subdomain: &str) -> String {
    if subdomain.is_empty() {
        "-".to_string()
    } else if subdomain.ends_with(".pages.dev") {
        subdomain.to_string()
    } else {
        format!("{}.pages.dev", subdomain)
    }
}
