use serde::Serialize;

use super::Post;

/// Posts of one month.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArchiveMonth<'a> {
    pub month: u32,
    pub posts: Vec<&'a Post>,
}

/// Posts of one year, grouped by month.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Archive<'a> {
    pub year: i32,
    pub months: Vec<ArchiveMonth<'a>>,
}

impl<'a> Archive<'a> {
    /// Group an already sorted post list by year and month, keeping its order.
    pub fn group(posts: &'a [Post]) -> Vec<Archive<'a>> {
        let mut archives: Vec<Archive<'a>> = Vec::new();
        for post in posts {
            let (year, month) = (post.doc.created.year(), post.doc.created.month());

            if archives.last().map_or(true, |a| a.year != year) {
                archives.push(Archive {
                    year,
                    months: Vec::new(),
                });
            }
            let Some(archive) = archives.last_mut() else {
                continue;
            };
            match archive.months.last_mut() {
                Some(m) if m.month == month => m.posts.push(post),
                _ => archive.months.push(ArchiveMonth {
                    month,
                    posts: vec![post],
                }),
            }
        }
        archives
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::post;
    use pretty_assertions::assert_eq;

    #[test]
    fn groups_by_year_and_month() {
        let posts = vec![
            post("d", "2022-02-10", ""),
            post("c", "2021-12-24", ""),
            post("b", "2021-12-01", ""),
            post("a", "2021-06-01", ""),
        ];

        let archives = Archive::group(&posts);

        let shape: Vec<(i32, Vec<(u32, usize)>)> = archives
            .iter()
            .map(|a| {
                (
                    a.year,
                    a.months.iter().map(|m| (m.month, m.posts.len())).collect(),
                )
            })
            .collect();
        assert_eq!(
            shape,
            vec![(2022, vec![(2, 1)]), (2021, vec![(12, 2), (6, 1)])]
        );
        assert_eq!(archives[1].months[0].posts[0].doc.slug, "c");
    }

    #[test]
    fn empty_post_list_has_no_archives() {
        assert!(Archive::group(&[]).is_empty());
    }
}
