use anyhow::Result;

use cantor_core::model::{HymnId, RankedHymn};
use cantor_core::schema::Database;
use cantor_search::{HymnService, Pagination};

use super::Output;

pub fn run_search(
    service: &HymnService<Database>,
    output: &Output,
    keyword: &str,
    page: usize,
    page_size: usize,
) -> Result<()> {
    let result = service.search(keyword, page, page_size)?;
    if output.is_json() {
        return output.json(&result);
    }
    output.hymns(&result.records)?;
    println!("\n{}", footer(&result));
    Ok(())
}

pub fn run_random(
    service: &mut HymnService<Database>,
    output: &Output,
    keyword: &str,
    page_size: usize,
) -> Result<()> {
    let picked = service.random_sample(keyword, page_size)?;
    output.hymns(&picked)
}

pub fn run_show(service: &HymnService<Database>, output: &Output, id: i64) -> Result<()> {
    let hymn = service.item_by_id(HymnId::new(id))?;
    if output.is_json() {
        return output.json(&hymn);
    }
    println!("{}", hymn.display_name);
    if !hymn.name_kr.is_empty() {
        println!("{}", hymn.name_kr);
    }
    println!();
    if !hymn.lyric.is_empty() {
        println!("{}\n", hymn.lyric);
    }
    if !hymn.link.is_empty() {
        println!("  Link: {}", hymn.link);
    }
    println!(
        "  Updated: {} by user {}",
        hymn.updated_at.format("%Y-%m-%d %H:%M:%S"),
        hymn.updated_by
    );
    Ok(())
}

pub fn run_similar(service: &HymnService<Database>, output: &Output, id: i64) -> Result<()> {
    let hymns = service.similar(HymnId::new(id))?;
    output.hymns(&hymns)
}

/// "Page 2 of 5 (23 hymns)  [1] 2 [3] ..." style pager line.
fn footer(page: &Pagination<RankedHymn>) -> String {
    let pages: Vec<String> = page
        .navigate_nos
        .iter()
        .map(|n| {
            if *n == page.page_num {
                format!("[{n}]")
            } else {
                n.to_string()
            }
        })
        .collect();
    let mut line = format!(
        "Page {} of {} ({} hymns)  {}",
        page.page_num,
        page.total_pages,
        page.total_records,
        pages.join(" ")
    );
    if page.navi_last_page < page.total_pages {
        line.push_str(" ...");
    }
    line
}
