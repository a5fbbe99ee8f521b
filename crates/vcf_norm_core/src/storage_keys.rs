pub const NORMALISED_FILE_PREFIX: &str = "normalised_";
pub const LOCATOR_SCHEME: &str = "s3://";

/// Final `/`-separated segment of an object key, or `None` when the key is
/// empty, ends in a separator, or ends in `.`/`..` (which would resolve
/// outside the directory the file is placed in).
pub fn object_file_name(key: &str) -> Option<&str> {
    key.rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// Destination key for a normalised file. Directory components of the input
/// key are dropped, so `input/batch-1/sample.vcf.gz` lands at
/// `<prefix>sample.vcf.gz`.
pub fn output_object_key(output_prefix: &str, input_key: &str) -> Option<String> {
    object_file_name(input_key).map(|name| format!("{output_prefix}{name}"))
}

pub fn normalised_file_name(input_file_name: &str) -> String {
    format!("{NORMALISED_FILE_PREFIX}{input_file_name}")
}

pub fn object_locator(bucket: &str, key: &str) -> String {
    format!("{LOCATOR_SCHEME}{bucket}/{key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_last_key_segment() {
        assert_eq!(
            object_file_name("input/batch-1/sample.vcf.gz"),
            Some("sample.vcf.gz")
        );
        assert_eq!(object_file_name("sample.vcf.gz"), Some("sample.vcf.gz"));
    }

    #[test]
    fn keys_without_file_name_are_rejected() {
        assert_eq!(object_file_name(""), None);
        assert_eq!(object_file_name("input/"), None);
        assert_eq!(object_file_name("input/.."), None);
        assert_eq!(object_file_name("input/."), None);
        assert_eq!(object_file_name(".."), None);
        assert_eq!(output_object_key("output/", "input/.."), None);
    }

    #[test]
    fn output_key_flattens_input_directories() {
        assert_eq!(
            output_object_key("output/", "input/sample.vcf.gz").as_deref(),
            Some("output/sample.vcf.gz")
        );
        assert_eq!(
            output_object_key("normalised/run-", "a/b/c/my sample.vcf.gz").as_deref(),
            Some("normalised/run-my sample.vcf.gz")
        );
    }

    #[test]
    fn dotted_file_names_are_kept() {
        assert_eq!(object_file_name("input/.hidden.vcf.gz"), Some(".hidden.vcf.gz"));
        assert_eq!(object_file_name("input/...vcf.gz"), Some("...vcf.gz"));
    }

    #[test]
    fn output_key_keeps_prefix_verbatim() {
        assert_eq!(
            output_object_key("", "input/sample.vcf.gz").as_deref(),
            Some("sample.vcf.gz")
        );
    }

    #[test]
    fn builds_normalised_file_name() {
        assert_eq!(
            normalised_file_name("sample.vcf.gz"),
            "normalised_sample.vcf.gz"
        );
    }

    #[test]
    fn builds_s3_locator() {
        assert_eq!(
            object_locator("my-bucket", "input/sample.vcf.gz"),
            "s3://my-bucket/input/sample.vcf.gz"
        );
    }
}
