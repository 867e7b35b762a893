//! Region catalog: the state → district lookup used to filter the jurisdiction phase.

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// States and union territories with their districts, as offered in the wizard
const REGIONS: &[(&str, &[&str])] = &[
    (
        "Andaman and Nicobar Islands",
        &[
            "Nicobar", "North and Middle Andaman", "South Andaman",
        ],
    ),
    (
        "Andhra Pradesh",
        &[
            "Alluri Sitharama Raju", "Anakapalli", "Ananthapuramu", "Annamayya", "Bapatla",
            "Chittoor", "Dr. B.R. Ambedkar Konaseema", "Eluru", "Guntur", "Kakinada", "Kurnool",
            "NTR", "Nandyal", "Palnadu", "Parvathipuram Manyam", "Prakasam", "SPS Nellore",
            "Sri Sathya Sai", "Srikakulam", "Tirupati", "Visakhapatanam", "Vizianagaram",
            "West Godavari", "YSR Kadapa",
        ],
    ),
    (
        "Telangana",
        &[
            "Adilabad", "Bhadradri Kothagudem", "Hanumakonda", "Hyderabad", "Jagtial", "Jangaon",
            "Jayashankar Bhupalpally", "Jogulamba Gadwal", "Kamareddy", "Karimnagar", "Khammam",
            "Kumuram Bheem Asifabad", "Mahabubabad", "Mahabubnagar", "Mancherial", "Medak",
            "Medchal-Malkajgiri", "Mulugu", "Nagarkurnool", "Nalgonda", "Narayanpet", "Nirmal",
            "Nizamabad", "Peddapalli", "Rajanna Sircilla", "Rangareddy", "Sangareddy", "Siddipet",
            "Suryapet", "Vikarabad", "Wanaparthy", "Warangal", "Yadadri Bhuvanagiri",
        ],
    ),
    (
        "Bihar",
        &[
            "Araria", "Arwal", "Aurangabad", "Banka", "Begusarai", "Bhagalpur", "Bhojpur", "Buxar",
            "Darbhanga", "East Champaran", "Gaya", "Gopalganj", "Jamui", "Jehanabad", "Kaimur",
            "Katihar", "Khagaria", "Kishanjganj", "Lakhisarai", "Madhepura", "Madhubani", "Munger",
            "Muzaffarpur", "Nalanda", "Nawada", "Patna", "Purnia", "Rohtas", "Saharsa", "Samastipur",
            "Saran", "Sheikhpura", "Sheohar", "Sitamarhi", "Siwan", "Supaul", "Vaishali",
            "West Champaran",
        ],
    ),
    (
        "Uttar Pradesh",
        &[
            "Agra", "Aligarh", "Prayagraj", "Ambedkar Nagar", "Amethi", "Amroha", "Auraiya",
            "Azamgarh", "Baghpat", "Bahraich", "Ballia", "Balrampur", "Banda", "Barabanki",
            "Bareilly", "Basti", "Bhadohi", "Bijnor", "Budaun", "Bulandshahr", "Chandauli",
            "Chitrakoot", "Deoria", "Etah", "Etawah", "Ayodhya", "Farrukhabad", "Fatehpur",
            "Firozabad", "Gautam Buddha Nagar", "Ghaziabad", "Ghazipur", "Gonda", "Gorakhpur",
            "Hamirpur", "Hapur", "Hardoi", "Hathras", "Jalaun", "Jaunpur", "Jhansi", "Kannauj",
            "Kanpur Dehat", "Kanpur Nagar", "Kasganj", "Kaushambi", "Kheri", "Kushinagar", "Lalitpur",
            "Lucknow", "Maharajganj", "Mahoba", "Mainpuri", "Mathura", "Mau", "Meerut", "Mirzapur",
            "Moradabad", "Muzaffarnagar", "Pilibhit", "Pratapgarh", "Rae Bareli", "Rampur",
            "Saharanpur", "Sambhal", "Sant Kabir Nagar", "Shahjahanpur", "Shamli", "Shravasti",
            "Siddharthnagar", "Sitapur", "Sonbhadra", "Sultanpur", "Unnao", "Varanasi",
        ],
    ),
];

static STATE_DISTRICTS: LazyLock<BTreeMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| REGIONS.iter().copied().collect());

/// All known states, sorted alphabetically
pub fn states() -> Vec<&'static str> {
    STATE_DISTRICTS.keys().copied().collect()
}

/// Districts of `state` in catalog order. Unknown states have none.
pub fn districts(state: &str) -> &'static [&'static str] {
    STATE_DISTRICTS.get(state).copied().unwrap_or(&[])
}

pub fn is_known_state(state: &str) -> bool {
    STATE_DISTRICTS.contains_key(state)
}

pub fn is_known_district(state: &str, district: &str) -> bool {
    districts(state).contains(&district)
}
