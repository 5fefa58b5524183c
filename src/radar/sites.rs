//! Radar sites of the German weather radar network.

use crate::radar::metadata::tag_enum;

tag_enum! {
    RadarSite, "radar site" {
        Asb => "asb",
        Boo => "boo",
        Drs => "drs",
        Eis => "eis",
        Emd => "emd",
        Ess => "ess",
        Fbg => "fbg",
        Fld => "fld",
        Hnr => "hnr",
        Isn => "isn",
        Mem => "mem",
        Neu => "neu",
        Nhb => "nhb",
        Oft => "oft",
        Pro => "pro",
        Ros => "ros",
        Tur => "tur",
        Umd => "umd",
    }
}
