//! Shared inputs for the scanner, aggregator and builder tests

pub const EMPTY_INPUT_1: &str = "";

pub const EMPTY_INPUT_2: &str = "  \n\t\n\n \n ";

pub const SIMPLE_INPUT: &str = "Config sectiontype 'sectionname'
\toption optionname 'optionvalue'
";

pub const EXPORT_INPUT: &str = "package \"pkgname\"
Config empty
Config squoted 'sqname'
Config dquoted \"dqname\"
Config multiline 'line1\\
\tline2'
";

pub const UNQUOTED_INPUT: &str = "Config foo bar\noption answer 42\n";

pub const UNNAMED_INPUT: &str = "
Config foo named
\toption pos '0'
\toption unnamed '0'
\tlist list 0

Config foo
\toption pos '1'
\toption unnamed '1'
\tlist list 10

Config foo
\toption pos '2'
\toption unnamed '1'
\tlist list 20

Config foo named
\toption pos '3'
\toption unnamed '0'
\tlist list 30
";

pub const HYPHENATED_INPUT: &str = "
Config wifi-device wl0
\toption type    'broadcom'
\toption channel '6'

Config wifi-iface wifi0
\toption device 'wl0'
\toption mode 'ap'
";

pub const COMMENT_INPUT: &str = "
# heading

# another heading
Config foo
\toption opt1 1
\t# option opt1 2
\toption opt2 3 # baa
\toption opt3 hello

# a comment block spanning
# multiple lines, surrounded
# by empty lines

# eof
";

pub const INVALID_INPUT: &str = "
<?xml version=\"1.0\">
<error message=\"not a UCI file\" />
";

pub const INCOMPLETE_PACKAGE: &str = "
package
";

pub const UNTERMINATED_QUOTED: &str = "
Config foo \"bar
";

pub const UNTERMINATED_UNQUOTED: &str = "
Config foo
\toption opt opt\\
";
