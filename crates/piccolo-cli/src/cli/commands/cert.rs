//! `piccolo cert` - Show a certificate and everything linked to it.
//!
//! With `--subject`, `--subject-hash` or `--name` the certificate is looked
//! up first: a single match is shown in detail, several are listed.

use anyhow::Result;
use colored::Colorize;
use piccolo_core::{CertName, MemoryStore};
use piccolo_graph::detail::certificate_detail;
use piccolo_graph::{
    find_certs, CertQuery, CertSummary, CertificateDetail, NamedCert, NamedRelative,
};
use tabled::{settings::Style, Table, Tabled};

use super::chain::SightingRow;
use super::Context;
use crate::cli::args::CertLookupArgs;
use crate::facts::resolve_cert;
use crate::output::{or_dash, print_structured, short};

#[derive(Tabled)]
struct RelativeRow {
    #[tabled(rename = "Hops")]
    distance: u32,
    #[tabled(rename = "Certificate")]
    hash: String,
    #[tabled(rename = "Subject")]
    subject: String,
}

impl From<&NamedRelative> for RelativeRow {
    fn from(r: &NamedRelative) -> Self {
        Self {
            distance: r.distance,
            hash: short(&r.hash).to_string(),
            subject: or_dash(r.name.as_deref()),
        }
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Certificate")]
    hash: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Issuer")]
    issuer: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Not after")]
    not_after: String,
}

impl From<&CertSummary> for SummaryRow {
    fn from(c: &CertSummary) -> Self {
        let key = if c.key_len > 0 {
            format!("{} {}", c.key_type, c.key_len)
        } else {
            c.key_type.clone()
        };
        Self {
            hash: short(&c.hash).to_string(),
            subject: or_dash(c.subject.as_deref()),
            issuer: or_dash(c.issuer.as_deref()),
            key,
            not_after: c.not_after.clone(),
        }
    }
}

#[derive(Tabled)]
struct NameRow {
    #[tabled(rename = "Type")]
    name_type: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Certificate")]
    cert: String,
}

impl From<&CertName> for NameRow {
    fn from(n: &CertName) -> Self {
        Self {
            name_type: n.name_type.clone(),
            name: n.name.clone(),
            cert: short(&n.cert_hash).to_string(),
        }
    }
}

pub async fn execute(ctx: Context, mut args: CertLookupArgs) -> Result<()> {
    ctx.reject_dot("cert")?;
    let store = ctx.store().await?;

    let hash = match args.hash.take() {
        Some(input) => resolve_cert(&store, &input)?,
        None => {
            let query = lookup_query(args)
                .ok_or_else(|| anyhow::anyhow!("certificate hash or lookup flag required"))?;
            let mut found = find_certs(&store, &query)?;
            if found.len() != 1 {
                if !print_structured(ctx.output_format, &found)? {
                    print_summaries_pretty(&query, &found);
                }
                return Ok(());
            }
            found.remove(0).hash
        }
    };

    show_detail(&ctx, &store, &hash)
}

fn lookup_query(args: CertLookupArgs) -> Option<CertQuery> {
    let CertLookupArgs {
        subject,
        subject_hash,
        name,
        name_type,
        ..
    } = args;
    subject
        .map(CertQuery::Subject)
        .or_else(|| subject_hash.map(CertQuery::SubjectHash))
        .or_else(|| name.map(|name| CertQuery::Name { name, name_type }))
}

fn show_detail(ctx: &Context, store: &MemoryStore, hash: &str) -> Result<()> {
    let expander = ctx.config.expander(store)?;
    let detail = certificate_detail(store, &expander, hash)?;

    if !print_structured(ctx.output_format, &detail)? {
        print_detail_pretty(&detail);
    }
    Ok(())
}

fn print_summaries_pretty(query: &CertQuery, found: &[CertSummary]) {
    println!(
        "{} {} {}",
        "Certificates:".bold(),
        query.to_string().cyan().bold(),
        format!("({} found)", found.len()).dimmed()
    );
    let rows: Vec<SummaryRow> = found.iter().map(SummaryRow::from).collect();
    println!("{}", Table::new(&rows).with(Style::rounded()));
}

fn print_names(title: &str, names: &[CertName]) {
    if names.is_empty() {
        return;
    }
    let rows: Vec<NameRow> = names.iter().map(NameRow::from).collect();
    println!();
    println!("{}", title.bold().underline());
    println!("{}", Table::new(&rows).with(Style::rounded()));
}

fn print_named(title: &str, certs: &[NamedCert]) {
    if certs.is_empty() {
        return;
    }
    println!();
    println!("{}", title.bold());
    for c in certs {
        println!("  {} {}", short(&c.hash).cyan(), or_dash(c.name.as_deref()));
    }
}

fn print_relatives(title: &str, relatives: &[NamedRelative]) {
    if relatives.is_empty() {
        return;
    }
    let rows: Vec<RelativeRow> = relatives.iter().map(RelativeRow::from).collect();
    println!();
    println!("{}", title.bold().underline());
    println!("{}", Table::new(&rows).with(Style::rounded()));
}

fn print_detail_pretty(detail: &CertificateDetail) {
    let cert = &detail.certificate;
    println!("{} {}", "Certificate:".bold(), cert.hash.cyan().bold());
    println!("  {} {}", "Subject:".bold(), or_dash(detail.subject.as_deref()));
    println!("  {} {}", "Issuer:".bold(), or_dash(detail.issuer.as_deref()));
    println!("  {} {}", "Serial:".bold(), cert.serial);
    println!("  {} v{}", "Version:".bold(), cert.version);
    println!(
        "  {} {} to {}",
        "Validity:".bold(),
        detail.not_before,
        detail.not_after
    );
    if detail.key_len > 0 {
        println!("  {} {} ({} bits)", "Key:".bold(), cert.key_type, detail.key_len);
    } else {
        println!("  {} {}", "Key:".bold(), cert.key_type);
    }
    if cert.is_ca {
        println!("  {} {}", "CA:".bold(), "yes".yellow());
    }

    if !detail.names.is_empty() {
        println!("  {}", "Valid for:".bold());
        for n in &detail.names {
            println!("    {} {}", format!("{}:", n.name_type).dimmed(), n.name);
        }
    }

    print_named("Issued by:", &detail.issuers);
    print_named("Issued:", &detail.issued);
    print_relatives("Transitive issuers:", &detail.transitive_issuers);
    print_relatives("Transitively issued:", &detail.transitive_issued);
    print_names("Names of issued certificates:", &detail.issued_names);
    print_names(
        "Names of transitively issued certificates:",
        &detail.transitive_issued_names,
    );

    if !detail.sightings.is_empty() {
        let rows: Vec<SightingRow> = detail.sightings.iter().map(SightingRow::from).collect();
        println!();
        println!("{}", "Seen in:".bold().underline());
        println!("{}", Table::new(&rows).with(Style::rounded()));
    }
}
